/// `load_config` module: assembles a [`PublishConfig`] from the pipeline environment.
///
/// This is the only place where environment variables are read. Reeve CI passes every
/// step parameter as an environment variable, so there is no config file.
///
/// # Checks, in order
/// 1. `REEVE_API` must be set. Without it the tool is not running inside a pipeline,
///    and this is reported separately from missing configuration.
/// 2. Every required variable must be set and non-empty. All missing names are
///    reported together.
///
/// Optional variables: `PACKAGE_REPOSITORY` (empty means unset) and `SKIP_EXISTING`
/// (only the exact value `true` enables it).
use package_publish_core::config::{PackageCoordinates, PublishConfig, RegistryConfig};
use package_publish_core::error::ConfigError;
use tracing::{error, info};

pub const REEVE_API: &str = "REEVE_API";
pub const FILES: &str = "FILES";
pub const API_URL: &str = "API_URL";
pub const API_USER: &str = "API_USER";
pub const API_PASSWORD: &str = "API_PASSWORD";
pub const PACKAGE_OWNER: &str = "PACKAGE_OWNER";
pub const PACKAGE_NAME: &str = "PACKAGE_NAME";
pub const PACKAGE_VERSION: &str = "PACKAGE_VERSION";
pub const PACKAGE_REPOSITORY: &str = "PACKAGE_REPOSITORY";
pub const SKIP_EXISTING: &str = "SKIP_EXISTING";

/// Loads the configuration from the process environment.
pub fn load_config() -> Result<PublishConfig, ConfigError> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Loads the configuration through `lookup`, which returns a variable's value if set.
pub fn load_config_from<F>(lookup: F) -> Result<PublishConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if non_empty(REEVE_API).is_none() {
        error!("REEVE_API is not set, refusing to run outside a Reeve CI pipeline");
        return Err(ConfigError::NotInPipeline);
    }

    let mut missing = Vec::new();
    let mut required = |name: &'static str| -> String {
        match non_empty(name) {
            Some(value) => value,
            None => {
                missing.push(name);
                String::new()
            }
        }
    };

    let files = required(FILES);
    let api_url = required(API_URL);
    let user = required(API_USER);
    let password = required(API_PASSWORD);
    let owner = required(PACKAGE_OWNER);
    let name = required(PACKAGE_NAME);
    let version = required(PACKAGE_VERSION);

    if !missing.is_empty() {
        error!(variables = ?missing, "Missing required configuration");
        return Err(ConfigError::Missing { variables: missing });
    }

    let config = PublishConfig {
        registry: RegistryConfig {
            api_url,
            user,
            password,
        },
        package: PackageCoordinates {
            owner,
            name,
            version,
        },
        files,
        repository: non_empty(PACKAGE_REPOSITORY),
        skip_existing: lookup(SKIP_EXISTING).as_deref() == Some("true"),
    };
    info!("Configuration loaded from environment");
    config.trace_loaded();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (REEVE_API, "http://reeve:9080"),
            (FILES, "dist/*.tar.gz"),
            (API_URL, "https://git.example.org"),
            (API_USER, "ci-bot"),
            (API_PASSWORD, "s3cret"),
            (PACKAGE_OWNER, "infra"),
            (PACKAGE_NAME, "tools"),
            (PACKAGE_VERSION, "1.4.0"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<PublishConfig, ConfigError> {
        load_config_from(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn loads_required_and_defaults() {
        let config = load(&full_env()).expect("config loads");
        assert_eq!(config.registry.api_url, "https://git.example.org");
        assert_eq!(config.registry.user, "ci-bot");
        assert_eq!(config.registry.password, "s3cret");
        assert_eq!(config.package.owner, "infra");
        assert_eq!(config.package.name, "tools");
        assert_eq!(config.package.version, "1.4.0");
        assert_eq!(config.files, "dist/*.tar.gz");
        assert_eq!(config.repository, None);
        assert!(!config.skip_existing);
    }

    #[test]
    fn missing_guard_is_reported_first() {
        let mut env = full_env();
        env.remove(REEVE_API);
        env.remove(API_URL);
        assert_eq!(load(&env).unwrap_err(), ConfigError::NotInPipeline);
    }

    #[test]
    fn empty_guard_counts_as_missing() {
        let mut env = full_env();
        env.insert(REEVE_API, "");
        assert_eq!(load(&env).unwrap_err(), ConfigError::NotInPipeline);
    }

    #[test]
    fn reports_every_missing_variable() {
        let mut env = full_env();
        env.remove(API_URL);
        env.insert(PACKAGE_VERSION, "");
        assert_eq!(
            load(&env).unwrap_err(),
            ConfigError::Missing {
                variables: vec![API_URL, PACKAGE_VERSION]
            }
        );
    }

    #[test]
    fn skip_existing_requires_exact_true() {
        let mut env = full_env();
        env.insert(SKIP_EXISTING, "true");
        assert!(load(&env).unwrap().skip_existing);

        for value in ["TRUE", "1", "yes", ""] {
            env.insert(SKIP_EXISTING, value);
            assert!(!load(&env).unwrap().skip_existing, "{value:?} enabled skip");
        }
    }

    #[test]
    fn empty_repository_is_unset() {
        let mut env = full_env();
        env.insert(PACKAGE_REPOSITORY, "");
        assert_eq!(load(&env).unwrap().repository, None);

        env.insert(PACKAGE_REPOSITORY, "tools-src");
        assert_eq!(load(&env).unwrap().repository.as_deref(), Some("tools-src"));
    }
}
