//! Error taxonomy for a publish run.
//!
//! Every failure stops the run where it happens. The variants map one-to-one onto the
//! phases of a run: configuration, file resolution, the optional listing query, the
//! upload loop and the optional repository link.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed transport/decoding error, kept opaque so the core does not depend on an HTTP stack.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration could not be assembled from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("this tool is a Reeve CI pipeline step and is not intended to be used on its own (REEVE_API is not set)")]
    NotInPipeline,

    #[error("missing required configuration: {}", .variables.join(", "))]
    Missing { variables: Vec<&'static str> },
}

/// The `FILES` pattern list could not be turned into a file list.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("error parsing file pattern list {input:?}: unbalanced quotes or trailing escape")]
    Split { input: String },

    #[error("error parsing file pattern \"{pattern}\" - {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("error matching file pattern \"{pattern}\" - {source}")]
    Walk {
        pattern: String,
        #[source]
        source: walkdir::Error,
    },
}

/// A single registry call failed.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("request failed: {0}")]
    Transport(#[source] BoxError),

    #[error("registry returned status {0}")]
    Status(u16),

    #[error("could not decode registry response: {0}")]
    Decode(#[source] BoxError),
}

/// The upload orchestrator aborted.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("error fetching package file list - {0}")]
    ListFiles(#[source] RegistryError),

    #[error("error opening file \"{}\" - {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error uploading file \"{}\" as {target_name} - {source}", .path.display())]
    Upload {
        path: PathBuf,
        target_name: String,
        #[source]
        source: RegistryError,
    },

    #[error("error linking package to repository \"{repository}\" - {source}")]
    Link {
        repository: String,
        #[source]
        source: RegistryError,
    },
}
