//! # contract: interface to a generic-package registry
//!
//! Defines the [`PackageRegistry`] trait the upload orchestrator talks to. The concrete
//! HTTP client lives in the CLI crate; tests use the `mockall`-generated
//! `MockPackageRegistry`, exported under the `test-export-mocks` feature.

use std::collections::HashSet;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde::Deserialize;
use tokio::fs::File;

use crate::config::PackageCoordinates;
use crate::error::RegistryError;

/// One entry of a package version's file listing. Other fields the registry returns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageFile {
    pub name: String,
}

/// Operations needed to publish files into a generic package.
///
/// Every call is a single blocking round-trip from the caller's point of view: no
/// retries, no timeouts beyond the transport's defaults.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Names of the files already stored in the package version.
    ///
    /// Returns `Ok(None)` when the package or version does not exist yet.
    async fn list_package_files(
        &self,
        package: &PackageCoordinates,
    ) -> Result<Option<HashSet<String>>, RegistryError>;

    /// Streams `content` into the package version as `target_name`.
    async fn upload_file(
        &self,
        package: &PackageCoordinates,
        target_name: &str,
        content: File,
    ) -> Result<(), RegistryError>;

    /// Links the package to a source repository.
    ///
    /// Forgejo rejects this when the link already exists, so callers should only
    /// request it when explicitly configured.
    async fn link_repository(
        &self,
        package: &PackageCoordinates,
        repository: &str,
    ) -> Result<(), RegistryError>;
}
