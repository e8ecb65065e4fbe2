///
/// This module implements the CLI entrypoint of package-publish. It parses the command
/// line, loads configuration, resolves files and drives the publish run.
///
/// All domain logic (sanitizing, file resolution, orchestration) lives in the
/// [`package-publish-core`] crate. This module only wires the pieces together in
/// pipeline order:
///
/// 1. configuration from the environment ([`load_config`])
/// 2. file resolution from `FILES`
/// 3. publishing through the HTTP [`ForgejoClient`]
///
/// Every failure is returned as an `anyhow::Error`. `main` turns it into a non-zero
/// exit status.
///
/// [`package-publish-core`]: ../../package-publish-core/
/// [`load_config`]: crate::load_config::load_config
/// [`ForgejoClient`]: crate::upload::ForgejoClient
use crate::load_config::load_config;
use crate::upload::ForgejoClient;
use anyhow::{Context, Result};
use clap::Parser;
use package_publish_core::publish::{publish, PublishReport};
use package_publish_core::resolve::{parse_patterns, resolve_files};
use std::path::PathBuf;

/// Publish local files as a generic package to a Forgejo/Gitea package registry.
///
/// All parameters are read from the environment (FILES, API_URL, API_USER,
/// API_PASSWORD, PACKAGE_OWNER, PACKAGE_NAME, PACKAGE_VERSION, PACKAGE_REPOSITORY,
/// SKIP_EXISTING).
#[derive(Parser, Debug, Default)]
#[clap(name = "package-publish", version)]
pub struct Cli {
    /// Load additional environment variables from this dotenv file first
    #[clap(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

/// Runs one publish pass. Returns the report on full success.
pub async fn run(cli: Cli) -> Result<PublishReport> {
    tracing::info!("trace_initialised");

    if let Some(env_file) = &cli.env_file {
        dotenvy::from_path(env_file)
            .with_context(|| format!("Failed to load env file {}", env_file.display()))?;
        tracing::info!(env_file = %env_file.display(), "Loaded environment file");
    }

    let config = load_config()?;

    let patterns = parse_patterns(&config.files)?;
    let files = resolve_files(&patterns)?;

    let client = ForgejoClient::new(&config.registry).context("Failed to build registry client")?;

    match publish(&config, &client, &files).await {
        Ok(report) => {
            tracing::info!(
                command = "publish",
                uploaded = report.uploaded.len(),
                skipped = report.skipped.len(),
                "Publish finished"
            );
            Ok(report)
        }
        Err(e) => {
            tracing::error!(command = "publish", error = %e, "Publish failed");
            Err(e.into())
        }
    }
}
