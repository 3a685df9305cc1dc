//! Buildplan - CI build-plan compiler
//!
//! This library turns a project's build configuration into an ordered,
//! resource-validated list of commands and translates it into the flat
//! parameter list a Jenkins-style scheduler consumes.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic (compilation, snapshots, translation)
//! - [`infra`] - Infrastructure layer (filesystem, git, storage)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
