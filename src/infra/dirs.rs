//! Platform-specific directory management
//!
//! Resolves where the settings file lives. Follows XDG on Linux and the
//! standard locations on macOS; `BUILDPLAN_CONFIG_DIR` overrides the default.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "BUILDPLAN_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "buildplan";

/// Settings file name
const SETTINGS_FILE: &str = "settings.toml";

/// Directory provider for buildplan
#[derive(Debug, Clone)]
pub struct BuildplanDirs {
    config_dir: PathBuf,
}

impl BuildplanDirs {
    /// Resolve directories from the environment or platform defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Config directory
    ///
    /// - Linux: `$XDG_CONFIG_HOME/buildplan` or `~/.config/buildplan`
    /// - macOS: `~/Library/Application Support/buildplan`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Path of `settings.toml` in the config directory
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for BuildplanDirs {
    fn default() -> Self {
        Self::new()
    }
}
