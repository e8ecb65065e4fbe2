#![doc = "package-publish-core: core logic for publishing files as a generic package."]

//! This crate holds the domain logic of `package-publish`:
//! - configuration types
//! - artifact-name sanitizing
//! - pattern parsing and file resolution
//! - the registry contract
//! - the upload orchestrator
//!
//! It reads no environment variables and has no concrete HTTP client. Those live in the
//! CLI crate.

pub mod config;
pub mod contract;
pub mod error;
pub mod publish;
pub mod resolve;
pub mod sanitize;
