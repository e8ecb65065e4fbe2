use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

/// Everything a publish run needs, already validated.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    pub registry: RegistryConfig,
    pub package: PackageCoordinates,
    /// Shell-quoted list of glob patterns, as given in `FILES`.
    pub files: String,
    /// Repository to link the package to after uploading, if any.
    pub repository: Option<String>,
    pub skip_existing: bool,
}

impl PublishConfig {
    pub fn trace_loaded(&self) {
        info!(
            api_url = %self.registry.api_url,
            api_user = %self.registry.user,
            owner = %self.package.owner,
            package = %self.package.name,
            version = %self.package.version,
            repository = self.repository.as_deref().unwrap_or("<none>"),
            skip_existing = self.skip_existing,
            "Loaded publish configuration"
        );
        debug!(files = %self.files, "File patterns");
    }
}

/// Base URL and basic-auth credentials of the package registry.
#[derive(Clone)]
pub struct RegistryConfig {
    pub api_url: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for RegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryConfig")
            .field("api_url", &self.api_url)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Owner/name/version of a generic package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageCoordinates {
    pub owner: String,
    pub name: String,
    pub version: String,
}

impl fmt::Display for PackageCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_debug_hides_password() {
        let registry = RegistryConfig {
            api_url: "https://git.example.org".into(),
            user: "ci-bot".into(),
            password: "s3cret".into(),
        };
        let rendered = format!("{registry:?}");
        assert!(rendered.contains("ci-bot"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn coordinates_display() {
        let package = PackageCoordinates {
            owner: "infra".into(),
            name: "tools".into(),
            version: "1.4.0".into(),
        };
        assert_eq!(package.to_string(), "infra/tools@1.4.0");
    }
}
