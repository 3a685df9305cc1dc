//! Dispatch command implementation
//!
//! Implements `buildplan dispatch <job>`: compiles and translates a job step,
//! then materializes its commands into an in-memory store and prints them.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use crate::cli::output::{status, OutputConfig};
use crate::core::settings::Settings;
use crate::infra::jobfile::JobFile;
use crate::infra::vcs;

/// Execute the dispatch command
pub fn execute(settings: &Settings, job_path: &Path, output: &OutputConfig) -> Result<ExitCode> {
    let job = JobFile::load(job_path)?;
    let mut store = job.store();
    let vcs = vcs::open(&job.context.repository);

    let Some(dispatch) = job
        .plan
        .dispatch(settings, &job.context, &mut store, vcs.as_deref())
        .context("Failed to dispatch job step")?
    else {
        return Ok(super::rejected(output));
    };

    if output.json {
        output.print_json(&dispatch)?;
        return Ok(ExitCode::SUCCESS);
    }

    output.status(
        status::SUCCESS,
        &format!(
            "Dispatched job step {} ({} parameters, {} commands)",
            job.context.jobstep.id,
            dispatch.params.len(),
            store.commands().len()
        ),
    );
    if output.quiet {
        return Ok(ExitCode::SUCCESS);
    }

    if store.commands().is_empty() {
        output.status(status::INFO, "Build type lists no commands");
    }
    for command in store.commands() {
        println!("\n[{}] {}", command.order, command.command_type);
        println!("{}", command.script);
        println!("  ({} environment variables)", command.env.len());
    }

    Ok(ExitCode::SUCCESS)
}
