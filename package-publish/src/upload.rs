#![doc = "Forgejo/Gitea generic-package client: the HTTP implementation of the core registry contract."]
//
//! # Registry client
//!
//! [`ForgejoClient`] implements [`PackageRegistry`] over the registry's REST API. Every
//! request uses HTTP basic auth. Path segments are percent-encoded.
//!
//! | operation            | request                                                         | success  |
//! |----------------------|-----------------------------------------------------------------|----------|
//! | `list_package_files` | `GET  /api/v1/packages/{owner}/generic/{name}/{version}/files`  | 200, 404 |
//! | `upload_file`        | `PUT  /api/packages/{owner}/generic/{name}/{version}/{file}`    | 201      |
//! | `link_repository`    | `POST /api/v1/packages/{owner}/generic/{name}/-/link/{repo}`    | 201      |

use std::collections::HashSet;

use async_trait::async_trait;
use package_publish_core::config::{PackageCoordinates, RegistryConfig};
use package_publish_core::contract::{PackageFile, PackageRegistry};
use package_publish_core::error::RegistryError;
use reqwest::{Body, Client, RequestBuilder, StatusCode};
use tokio::fs::File;
use urlencoding::encode;

pub struct ForgejoClient {
    http: Client,
    base_url: String,
    user: String,
    password: String,
}

impl ForgejoClient {
    pub fn new(registry: &RegistryConfig) -> Result<Self, RegistryError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::Transport(Box::new(e)))?;
        tracing::info!(
            api_url = %registry.api_url,
            api_user = %registry.user,
            "Initialized registry client"
        );
        Ok(ForgejoClient {
            http,
            base_url: registry.api_url.trim_end_matches('/').to_string(),
            user: registry.user.clone(),
            password: registry.password.clone(),
        })
    }

    fn files_url(&self, package: &PackageCoordinates) -> String {
        format!(
            "{}/api/v1/packages/{}/generic/{}/{}/files",
            self.base_url,
            encode(&package.owner),
            encode(&package.name),
            encode(&package.version)
        )
    }

    fn upload_url(&self, package: &PackageCoordinates, target_name: &str) -> String {
        format!(
            "{}/api/packages/{}/generic/{}/{}/{}",
            self.base_url,
            encode(&package.owner),
            encode(&package.name),
            encode(&package.version),
            encode(target_name)
        )
    }

    fn link_url(&self, package: &PackageCoordinates, repository: &str) -> String {
        format!(
            "{}/api/v1/packages/{}/generic/{}/-/link/{}",
            self.base_url,
            encode(&package.owner),
            encode(&package.name),
            encode(repository)
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.user, Some(&self.password))
    }
}

#[async_trait]
impl PackageRegistry for ForgejoClient {
    async fn list_package_files(
        &self,
        package: &PackageCoordinates,
    ) -> Result<Option<HashSet<String>>, RegistryError> {
        let url = self.files_url(package);
        tracing::debug!(%url, "Fetching package file list");

        let response = self
            .authed(self.http.get(&url))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, %url, "Request for package file list failed");
                RegistryError::Transport(Box::new(e))
            })?;

        match response.status() {
            StatusCode::OK => {
                let files: Vec<PackageFile> = response.json().await.map_err(|e| {
                    tracing::error!(error = ?e, %url, "Failed to decode package file list");
                    RegistryError::Decode(Box::new(e))
                })?;
                tracing::info!(count = files.len(), "Fetched package file list");
                Ok(Some(files.into_iter().map(|file| file.name).collect()))
            }
            StatusCode::NOT_FOUND => {
                tracing::info!(%url, "Package version not found, treating file list as empty");
                Ok(None)
            }
            status => {
                tracing::error!(status = status.as_u16(), %url, "Unexpected status fetching package file list");
                Err(RegistryError::Status(status.as_u16()))
            }
        }
    }

    async fn upload_file(
        &self,
        package: &PackageCoordinates,
        target_name: &str,
        content: File,
    ) -> Result<(), RegistryError> {
        let url = self.upload_url(package, target_name);
        tracing::debug!(%url, "Uploading package file");

        let response = self
            .authed(self.http.put(&url))
            .body(Body::from(content))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, %url, "Upload request failed");
                RegistryError::Transport(Box::new(e))
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::error!(status = status.as_u16(), %url, "Unexpected status uploading file");
            return Err(RegistryError::Status(status.as_u16()));
        }
        tracing::info!(target_name, "Uploaded package file");
        Ok(())
    }

    async fn link_repository(
        &self,
        package: &PackageCoordinates,
        repository: &str,
    ) -> Result<(), RegistryError> {
        let url = self.link_url(package, repository);
        tracing::debug!(%url, "Linking package to repository");

        let response = self
            .authed(self.http.post(&url))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, %url, "Link request failed");
                RegistryError::Transport(Box::new(e))
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            tracing::error!(status = status.as_u16(), %url, "Unexpected status linking repository");
            return Err(RegistryError::Status(status.as_u16()));
        }
        tracing::info!(repository, "Linked package to repository");
        Ok(())
    }
}
