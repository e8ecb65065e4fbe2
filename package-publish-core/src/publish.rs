//! Upload orchestration: existing-file query → upload loop → repository link.
//!
//! The run is strictly sequential and fail-fast. The first failed call stops the
//! run and is returned to the caller. Uploads that already completed stay in the
//! registry. Nothing is rolled back.
//!
//! # Phases
//! 1. When `skip_existing` is set, the file listing of the package version is fetched
//!    once. A missing package or version counts as an empty listing.
//! 2. Each file is mapped to its target name (see [`crate::sanitize::target_name`]).
//!    A file whose target name is already listed is skipped. Any other file is opened
//!    and streamed to the registry. Its handle is released before the next file is
//!    opened.
//! 3. When a repository is configured, the package is linked to it.
//!
//! Entrypoint: [`publish`]. Output: [`PublishReport`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::PublishConfig;
use crate::contract::PackageRegistry;
use crate::error::PublishError;
use crate::sanitize::target_name;

/// What a completed run did.
#[derive(Debug, Default, Serialize)]
pub struct PublishReport {
    pub uploaded: Vec<PublishedFile>,
    pub skipped: Vec<PublishedFile>,
    pub linked_repository: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedFile {
    pub source: PathBuf,
    pub target_name: String,
}

pub async fn publish<R>(
    config: &PublishConfig,
    registry: &R,
    files: &[PathBuf],
) -> Result<PublishReport, PublishError>
where
    R: PackageRegistry + ?Sized,
{
    let package = &config.package;
    info!(package = %package, files = files.len(), "Starting publish");

    let existing = if config.skip_existing {
        fetch_existing(config, registry).await?
    } else {
        None
    };

    let mut report = PublishReport::default();
    let mut targets: HashMap<String, PathBuf> = HashMap::new();

    for path in files {
        let target = target_name(path);

        if existing.as_ref().is_some_and(|names| names.contains(&target)) {
            info!(
                file = %path.display(),
                target_name = %target,
                "Skipping file because it already exists in the package"
            );
            report.skipped.push(PublishedFile {
                source: path.clone(),
                target_name: target,
            });
            continue;
        }

        if let Some(previous) = targets.get(&target) {
            warn!(
                file = %path.display(),
                previous = %previous.display(),
                target_name = %target,
                "Target name collides with an earlier file, the earlier upload will be overwritten"
            );
        }

        upload_one(config, registry, path, &target).await?;
        targets.insert(target.clone(), path.clone());
        report.uploaded.push(PublishedFile {
            source: path.clone(),
            target_name: target,
        });
    }

    if let Some(repository) = config.repository.as_deref() {
        info!(package = %package.name, repository, "Linking package to repository");
        if let Err(e) = registry.link_repository(package, repository).await {
            error!(repository, error = %e, "Linking repository failed");
            return Err(PublishError::Link {
                repository: repository.to_string(),
                source: e,
            });
        }
        report.linked_repository = Some(repository.to_string());
    }

    info!(
        uploaded = report.uploaded.len(),
        skipped = report.skipped.len(),
        linked = report.linked_repository.is_some(),
        "Publish complete"
    );
    match serde_json::to_string(&report) {
        Ok(json) => debug!(report = %json, "Publish report"),
        Err(e) => debug!(error = %e, "Failed to serialize publish report"),
    }
    Ok(report)
}

async fn fetch_existing<R>(
    config: &PublishConfig,
    registry: &R,
) -> Result<Option<HashSet<String>>, PublishError>
where
    R: PackageRegistry + ?Sized,
{
    match registry.list_package_files(&config.package).await {
        Ok(Some(names)) => {
            info!(count = names.len(), "Fetched existing package files");
            Ok(Some(names))
        }
        Ok(None) => {
            info!(package = %config.package, "Package version does not exist yet");
            Ok(None)
        }
        Err(e) => {
            error!(error = %e, "Fetching package file list failed");
            Err(PublishError::ListFiles(e))
        }
    }
}

async fn upload_one<R>(
    config: &PublishConfig,
    registry: &R,
    path: &Path,
    target: &str,
) -> Result<(), PublishError>
where
    R: PackageRegistry + ?Sized,
{
    info!(file = %path.display(), target_name = target, "Uploading file");

    let content = tokio::fs::File::open(path).await.map_err(|source| {
        error!(file = %path.display(), error = %source, "Failed to open file");
        PublishError::Open {
            path: path.to_path_buf(),
            source,
        }
    })?;

    registry
        .upload_file(&config.package, target, content)
        .await
        .map_err(|source| {
            error!(file = %path.display(), target_name = target, error = %source, "Upload failed");
            PublishError::Upload {
                path: path.to_path_buf(),
                target_name: target.to_string(),
                source,
            }
        })
}
