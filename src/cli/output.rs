//! Output formatting
//!
//! Human-readable and JSON output for the CLI, plus error display.

use serde::Serialize;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Output settings from the global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Suppress everything but errors and requested data
    pub quiet: bool,
    /// Print JSON instead of text
    pub json: bool,
    /// Verbosity (0 warn, 1 info, 2+ debug)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create from the global flags
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Log level directive for the tracing filter
    pub fn log_level(&self) -> tracing::Level {
        match (self.quiet, self.verbose) {
            (true, _) => tracing::Level::ERROR,
            (false, 0) => tracing::Level::WARN,
            (false, 1) => tracing::Level::INFO,
            (false, _) => tracing::Level::DEBUG,
        }
    }

    /// Print a status line unless quiet or in JSON mode
    pub fn status(&self, prefix: &str, message: &str) {
        if !self.quiet && !self.json {
            println!("{prefix} {message}");
        }
    }

    /// Print `value` as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Display an error with its cause chain on stderr
pub fn display_error(err: &anyhow::Error, config: &OutputConfig) {
    if config.json {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": causes,
        });
        eprintln!("{body}");
        return;
    }

    eprintln!("{} Error: {err}", status::ERROR);
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}
