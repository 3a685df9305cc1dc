//! Compile command implementation
//!
//! Implements `buildplan compile <job>` to print a job's compiled plan.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use crate::cli::output::{status, OutputConfig};
use crate::core::settings::Settings;
use crate::infra::jobfile::JobFile;

/// Execute the compile command
pub fn execute(settings: &Settings, job_path: &Path, output: &OutputConfig) -> Result<ExitCode> {
    let job = JobFile::load(job_path)?;
    let store = job.store();

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
    let fingerprint = plan.fingerprint()?;

    if output.json {
        output.print_json(&serde_json::json!({
            "build_type": builder.build_type(),
            "mode": job.plan.mode().name(),
            "fingerprint": fingerprint,
            "plan": plan,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    output.status(
        status::SUCCESS,
        &format!(
            "Compiled {} plan for {} ({} commands)",
            job.plan.mode().name(),
            job.context.project.slug,
            plan.commands().len()
        ),
    );
    if output.quiet {
        return Ok(ExitCode::SUCCESS);
    }

    let resources = plan.resources();
    println!(
        "\nResources: {} cpus, {} MiB, {} executors",
        resources.cpus, resources.mem_mb, resources.max_executors
    );
    if !plan.artifacts().is_empty() {
        let artifacts: Vec<&str> = plan.artifacts().iter().map(String::as_str).collect();
        println!("Artifacts: {}", artifacts.join(", "));
    }
    if !plan.artifact_suffix().is_empty() {
        println!("Artifact suffix: {}", plan.artifact_suffix());
    }
    println!("Fingerprint: {fingerprint}");

    for command in plan.commands() {
        println!("\n[{}] {}", command.order, command.command_type);
        println!("{}", command.script);
    }

    Ok(ExitCode::SUCCESS)
}
