//! Params command implementation
//!
//! Implements `buildplan params <job>` to print the scheduler parameters of
//! a job step as `NAME=value` lines or a JSON array.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use crate::cli::output::OutputConfig;
use crate::core::builder::ParameterOverrides;
use crate::core::settings::Settings;
use crate::infra::jobfile::JobFile;
use crate::infra::vcs;

/// Execute the params command
pub fn execute(settings: &Settings, job_path: &Path, output: &OutputConfig) -> Result<ExitCode> {
    let job = JobFile::load(job_path)?;
    let store = job.store();
    let vcs = vcs::open(&job.context.repository);

    let builder = job
        .plan
        .builder(settings)
        .context("Failed to configure build step")?;
    let Some(plan) = job
        .plan
        .implementation(&builder, &job.context, &store)
        .context("Failed to compile build plan")?
    else {
        return Ok(super::rejected(output));
    };

    let params = builder
        .job_parameters(
            &job.context,
            &plan,
            ParameterOverrides::default(),
            &store,
            vcs.as_deref(),
        )
        .context("Failed to translate job parameters")?;

    if output.json {
        output.print_json(&params)?;
    } else {
        for param in &params {
            println!("{}={}", param.name, param.value);
        }
    }

    Ok(ExitCode::SUCCESS)
}
