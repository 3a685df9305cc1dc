//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod check;
pub mod compile;
pub mod dispatch;
pub mod params;

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::cli::output::OutputConfig;
use crate::core::settings::Settings;
use crate::infra::dirs::BuildplanDirs;

/// Exit code when resource validation rejects a plan
pub const EXIT_REJECTED: u8 = 2;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load and validate the settings file
    Check,

    /// Compile the build plan of a job
    Compile {
        /// Job file (JSON)
        job: PathBuf,
    },

    /// Print the scheduler parameters of a job step
    Params {
        /// Job file (JSON)
        job: PathBuf,
    },

    /// Translate a job step and materialize its commands
    Dispatch {
        /// Job file (JSON)
        job: PathBuf,
    },
}

impl Commands {
    /// Execute the command
    pub fn run(self, settings: Option<&Path>, output: &OutputConfig) -> Result<ExitCode> {
        let settings = load_settings(settings)?;
        match self {
            Self::Check => check::execute(&settings, output),
            Self::Compile { job } => compile::execute(&settings, &job, output),
            Self::Params { job } => params::execute(&settings, &job, output),
            Self::Dispatch { job } => dispatch::execute(&settings, &job, output),
        }
    }
}

/// Load settings from `path`, or from the config directory
fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => BuildplanDirs::new().settings_path(),
    };
    tracing::info!("Loading settings from {}", path.display());

    Settings::load_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

/// Exit code for a plan rejected by resource validation
fn rejected(output: &OutputConfig) -> ExitCode {
    output.status(
        crate::cli::output::status::WARNING,
        "No implementation: resources are outside the cluster limits",
    );
    ExitCode::from(EXIT_REJECTED)
}
