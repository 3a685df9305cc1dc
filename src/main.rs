//! Buildplan CLI - CI build-plan compiler
//!
//! Entry point for the buildplan command-line application.

use clap::Parser;
use std::process::ExitCode;

use buildplan::cli::output::display_error;
use buildplan::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = cli.output();

    // RUST_LOG directives win over the -v/-q level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(output.log_level().into())
                .from_env_lossy(),
        )
        .init();

    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            display_error(&e, &output);
            ExitCode::FAILURE
        }
    }
}
