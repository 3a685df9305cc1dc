//! Error types for buildplan
//!
//! Domain-specific error types using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Settings loading and validation errors
///
/// All of these are fatal: settings are validated once at load time so that a
/// broken build type never reaches dispatch.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read settings file
    #[error("Failed to read settings file '{path}': {error}")]
    ReadError { path: PathBuf, error: String },

    /// Failed to parse settings file
    #[error("Failed to parse settings file '{path}': {error}")]
    ParseError { path: PathBuf, error: String },

    /// Client build type without one of its required keys
    #[error("[build_types INVALID] build type {build_type} missing required key: {key}")]
    MissingBuildTypeKey { build_type: String, key: String },

    /// Build type not present in the build type table
    #[error("Build type '{name}' is not defined in build_types")]
    UnknownBuildType { name: String },

    /// Resource limits that no request could satisfy
    #[error("Invalid resource limits: {message}")]
    InvalidLimits { message: String },
}

/// Errors reading the typed view of a project's configuration
#[derive(Error, Debug)]
pub enum ProjectConfigError {
    /// A known key holds a value of the wrong shape
    #[error("Project config key '{key}' is invalid: {error}")]
    InvalidValue { key: String, error: String },
}

/// Script template rendering errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    /// Placeholder without a value
    #[error("Template placeholder '{{{name}}}' has no value")]
    MissingValue { name: String },

    /// Placeholder pattern failed to compile
    #[error("Invalid placeholder pattern: {error}")]
    InvalidPattern { error: String },
}

/// Build-plan compilation errors
///
/// Resource limit violations are not errors: they compile to no plan.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Project configuration could not be read
    #[error("Project config error: {0}")]
    ProjectConfig(#[from] ProjectConfigError),

    /// Script template could not be rendered
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
}

/// Persistence collaborator errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend failure
    #[error("Store backend error: {error}")]
    Backend { error: String },
}

/// VCS backend errors
#[derive(Error, Debug)]
pub enum VcsError {
    /// Repository could not be opened
    #[error("Invalid repository at '{path}': {error}")]
    InvalidRepository { path: PathBuf, error: String },

    /// Revision id could not be parsed or found
    #[error("Revision '{revision}' not found: {error}")]
    RevisionNotFound { revision: String, error: String },

    /// History walk failed
    #[error("Failed to walk history: {error}")]
    WalkFailed { error: String },
}

/// Builder construction and dispatch errors
#[derive(Error, Debug)]
pub enum BuilderError {
    /// Build type not present in the settings
    #[error("Build type '{name}' is not defined in build_types")]
    UnknownBuildType { name: String },

    /// Cluster without master URLs
    #[error("Cluster '{name}' has no master URLs configured")]
    UnknownCluster { name: String },

    /// Build type present but incomplete
    #[error("Invalid build type: {0}")]
    InvalidBuildType(#[from] SettingsError),

    /// Persistence failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Compilation failure
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
}

/// Top-level buildplan error type
#[derive(Error, Debug)]
pub enum BuildplanError {
    /// Settings error
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Project config error
    #[error("Project config error: {0}")]
    ProjectConfig(#[from] ProjectConfigError),

    /// Compile error
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// VCS error
    #[error("VCS error: {0}")]
    Vcs(#[from] VcsError),

    /// Builder error
    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    /// Job file could not be read or parsed
    #[error("Invalid job file '{path}': {error}")]
    InvalidJobFile { path: PathBuf, error: String },

    /// IO error
    #[error("IO error: {source}")]
    Io { source: std::io::Error },

    /// Generic error
    #[error("{0}")]
    Generic(String),
}

impl From<std::io::Error> for BuildplanError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source }
    }
}
