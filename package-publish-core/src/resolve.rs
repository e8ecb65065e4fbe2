//! Turns the `FILES` pattern list into the ordered list of files to upload.
//!
//! Patterns are split with shell rules (quotes and backslash escapes). Each pattern is
//! compiled with `globset` and matched against a `walkdir` walk rooted at its longest
//! literal directory prefix. The dialect supports recursive `**`, `{a,b}`
//! alternatives and character classes. A `**` sharing a path component with other
//! characters behaves like `*`. Only regular files are kept, then the list is
//! deduplicated and sorted byte-wise so the upload order is reproducible.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::error::ResolveError;

const META: [char; 5] = ['*', '?', '[', '{', '\\'];

/// Splits a shell-quoted string into glob pattern tokens.
pub fn parse_patterns(input: &str) -> Result<Vec<String>, ResolveError> {
    match shlex::split(input) {
        Some(patterns) => {
            debug!(count = patterns.len(), "Parsed file pattern list");
            Ok(patterns)
        }
        None => {
            error!(input, "Failed to split file pattern list");
            Err(ResolveError::Split {
                input: input.to_string(),
            })
        }
    }
}

/// Expands every pattern and returns the distinct regular files, sorted.
pub fn resolve_files<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>, ResolveError> {
    let mut files = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let before = files.len();
        expand(pattern, &mut files)?;
        debug!(pattern, matched = files.len() - before, "Expanded file pattern");
    }

    let mut files = distinct(files);
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    info!(count = files.len(), "Resolved files to publish");
    Ok(files)
}

/// Where a pattern's walk starts and how deep it may go.
#[derive(Debug, PartialEq, Eq)]
enum WalkRoot {
    /// The pattern has no wildcards and names a single path.
    Literal,
    /// Walk from `base` (empty means the working directory); `None` depth is unbounded.
    Dir { base: String, max_depth: Option<usize> },
}

fn expand(pattern: &str, files: &mut Vec<PathBuf>) -> Result<(), ResolveError> {
    let normalized = collapse_inner_recursion(pattern);

    let (base, max_depth) = match walk_root(&normalized) {
        WalkRoot::Literal => {
            let path = Path::new(pattern);
            if path.is_file() {
                files.push(path.to_path_buf());
            }
            return Ok(());
        }
        WalkRoot::Dir { base, max_depth } => (base, max_depth),
    };

    let matcher = compile(pattern, &normalized)?;

    let root = if base.is_empty() { "." } else { base.as_str() };
    if !Path::new(root).is_dir() {
        debug!(pattern, root, "Pattern root does not exist");
        return Ok(());
    }

    let mut walker = WalkDir::new(root).min_depth(1);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }
    for entry in walker {
        let entry = entry.map_err(|source| {
            error!(pattern, error = %source, "Failed to walk directory for file pattern");
            ResolveError::Walk {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        let path = entry.path();
        let candidate = if base.is_empty() {
            path.strip_prefix(".").unwrap_or(path)
        } else {
            path
        };
        if matcher.is_match(candidate) && candidate.is_file() {
            files.push(candidate.to_path_buf());
        }
    }
    Ok(())
}

fn compile(pattern: &str, normalized: &str) -> Result<GlobMatcher, ResolveError> {
    GlobBuilder::new(normalized)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| {
            error!(pattern, error = %source, "Invalid file pattern");
            ResolveError::Pattern {
                pattern: pattern.to_string(),
                source,
            }
        })
}

/// Splits off the leading components that contain no glob syntax.
fn walk_root(pattern: &str) -> WalkRoot {
    let components: Vec<&str> = pattern.split('/').collect();
    let literal = components
        .iter()
        .take_while(|component| !component.contains(&META[..]))
        .count();
    if literal == components.len() {
        return WalkRoot::Literal;
    }

    let mut base = components[..literal].join("/");
    if base.is_empty() && pattern.starts_with('/') {
        base.push('/');
    }
    let rest = &components[literal..];
    let max_depth = if rest.iter().any(|component| *component == "**") {
        None
    } else {
        Some(rest.len())
    };
    WalkRoot::Dir { base, max_depth }
}

/// Rewrites every `**` that is not a whole path component to `*`.
fn collapse_inner_recursion(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|component| {
            if component == "**" || !component.contains("**") {
                return component.to_string();
            }
            let mut out = String::with_capacity(component.len());
            let mut escaped = false;
            let mut previous_star = false;
            for c in component.chars() {
                if escaped {
                    escaped = false;
                    previous_star = false;
                    out.push(c);
                    continue;
                }
                match c {
                    '*' if previous_star => {}
                    '*' => {
                        previous_star = true;
                        out.push(c);
                    }
                    '\\' => {
                        escaped = true;
                        previous_star = false;
                        out.push(c);
                    }
                    _ => {
                        previous_star = false;
                        out.push(c);
                    }
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Drops repeated paths, keeping the first occurrence.
fn distinct(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(paths.len());
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}
