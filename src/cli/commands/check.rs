//! Check command implementation
//!
//! Implements `buildplan check` to validate the settings file.

use anyhow::Result;
use serde::Serialize;
use std::process::ExitCode;

use crate::cli::output::{status, OutputConfig};
use crate::core::settings::Settings;

#[derive(Serialize)]
struct BuildTypeSummary<'a> {
    name: &'a str,
    uses_client: bool,
    can_snapshot: bool,
    commands: usize,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    default_build_type: &'a str,
    server_api_url: String,
    build_types: Vec<BuildTypeSummary<'a>>,
    clusters: Vec<&'a str>,
}

/// Execute the check command
///
/// Settings are validated when they are loaded, so reaching this point
/// means they are valid.
pub fn execute(settings: &Settings, output: &OutputConfig) -> Result<ExitCode> {
    let report = CheckReport {
        default_build_type: &settings.default_build_type,
        server_api_url: settings.server_api_url(),
        build_types: settings
            .build_types
            .iter()
            .map(|(name, desc)| BuildTypeSummary {
                name,
                uses_client: desc.uses_client,
                can_snapshot: desc.can_snapshot,
                commands: desc.commands.len(),
            })
            .collect(),
        clusters: settings.clusters.keys().map(String::as_str).collect(),
    };

    if output.json {
        output.print_json(&report)?;
        return Ok(ExitCode::SUCCESS);
    }

    output.status(status::SUCCESS, "Settings are valid");
    if output.quiet {
        return Ok(ExitCode::SUCCESS);
    }

    println!("\nServer API: {}", report.server_api_url);
    println!("\nBuild types:");
    for build_type in &report.build_types {
        let default = if build_type.name == report.default_build_type {
            " (default)"
        } else {
            ""
        };
        let client = if build_type.uses_client { "client" } else { "legacy" };
        println!(
            "  • {}{default}: {client}, {} commands{}",
            build_type.name,
            build_type.commands,
            if build_type.can_snapshot { ", snapshots" } else { "" }
        );
    }

    println!("\nClusters:");
    if report.clusters.is_empty() {
        println!("  (none)");
    }
    for cluster in &report.clusters {
        println!("  • {cluster}");
    }

    Ok(ExitCode::SUCCESS)
}
