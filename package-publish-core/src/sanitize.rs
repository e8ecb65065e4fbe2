//! Maps source file names onto registry artifact names.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

static DISALLOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^-.+a-zA-Z0-9]+").expect("static pattern is valid"));

/// Replaces every run of characters outside `[-.+a-zA-Z0-9]` with a single `_`.
pub fn sanitize_name(name: &str) -> String {
    DISALLOWED.replace_all(name, "_").into_owned()
}

/// Artifact name a file is stored under: its sanitized base name.
///
/// Used both for the existence check and for the upload, so the two always agree.
pub fn target_name(path: &Path) -> String {
    let base = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => path.as_os_str().to_string_lossy(),
    };
    sanitize_name(&base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(c: char) -> bool {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+' | '_')
    }

    #[test]
    fn replaces_runs_with_single_underscore() {
        assert_eq!(sanitize_name("report v1.2!.txt"), "report_v1.2_.txt");
        assert_eq!(sanitize_name("a   b"), "a_b");
        assert_eq!(sanitize_name("!!!"), "_");
    }

    #[test]
    fn keeps_allowed_characters() {
        assert_eq!(sanitize_name("app-1.0+build.7.tar.gz"), "app-1.0+build.7.tar.gz");
    }

    #[test]
    fn underscore_is_itself_replaced_by_underscore() {
        assert_eq!(sanitize_name("my_file"), "my_file");
        assert_eq!(sanitize_name("my_ _file"), "my_file");
    }

    #[test]
    fn non_ascii_collapses() {
        assert_eq!(sanitize_name("résumé.pdf"), "r_sum_.pdf");
        assert_eq!(sanitize_name("数据.csv"), "_.csv");
    }

    #[test]
    fn output_alphabet_and_idempotence() {
        let samples = [
            "",
            "plain.txt",
            "report v1.2!.txt",
            "with\ttab\nnewline",
            "__init__.py",
            "ü-ö-ä",
            "a:b;c,d=e",
            "emoji 🚀 rocket.bin",
        ];
        for sample in samples {
            let once = sanitize_name(sample);
            assert!(once.chars().all(allowed), "{sample:?} -> {once:?}");
            assert_eq!(sanitize_name(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn target_name_uses_base_name_only() {
        assert_eq!(target_name(Path::new("dist/linux x64/app 1.bin")), "app_1.bin");
        assert_eq!(target_name(Path::new("README.md")), "README.md");
    }
}
