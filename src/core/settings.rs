//! Process-wide settings
//!
//! Reads the settings file (`settings.toml` in the config directory) that
//! holds the build type table, cluster endpoints, resource limits, snapshot
//! and LXC defaults and the package mirror used by autogenerated builds.
//!
//! Settings are validated once, when they are loaded. After that they are
//! read-only and passed by reference into compilation and translation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use url::Url;

use crate::config::defaults::{
    API_PATH, DEFAULT_BUILD_TYPE, DEFAULT_LXC_RELEASE, DEFAULT_SERVER_URL,
};
use crate::core::build_desc::BuildDescription;
use crate::core::resources::ResourceLimits;
use crate::error::SettingsError;
use crate::infra::dirs::BuildplanDirs;

/// Settings shared by every build of the process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Build type used when a step does not name one
    #[serde(default = "default_build_type")]
    pub default_build_type: String,

    /// Base URL of the server clients report back to
    #[serde(default = "default_server_url")]
    pub server_url: Url,

    /// Bucket snapshot images are stored in
    #[serde(default)]
    pub snapshot_bucket: String,

    /// Per-executor resource limits
    #[serde(default)]
    pub limits: ResourceLimits,

    /// LXC defaults for client builds
    #[serde(default)]
    pub lxc: LxcDefaults,

    /// Package mirror used by autogenerated builds
    #[serde(default)]
    pub packages: PackageSettings,

    /// Cluster name to master URLs
    #[serde(default)]
    pub clusters: BTreeMap<String, Vec<String>>,

    /// Build type name to description
    #[serde(default = "default_build_types")]
    pub build_types: BTreeMap<String, BuildDescription>,
}

/// LXC defaults, used when a build type has no override
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LxcDefaults {
    /// Pre-launch script
    #[serde(default)]
    pub pre_launch: String,

    /// Post-launch script
    #[serde(default)]
    pub post_launch: String,

    /// Container release
    #[serde(default = "default_release")]
    pub release: String,
}

impl Default for LxcDefaults {
    fn default() -> Self {
        Self {
            pre_launch: String::new(),
            post_launch: String::new(),
            release: default_release(),
        }
    }
}

/// Package mirror and bazel bootstrap settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSettings {
    /// Apt source line written to `/etc/apt/sources.list`
    #[serde(default)]
    pub apt_spec: String,

    /// Pinned apt packages installed before bazel runs
    #[serde(default = "default_bazel_apt_pkgs")]
    pub bazel_apt_pkgs: Vec<String>,

    /// Bazel output user root
    #[serde(default = "default_bazel_root_path")]
    pub bazel_root_path: String,

    /// Rsync URL encap dependencies are synced from
    #[serde(default)]
    pub encap_rsync_url: String,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            apt_spec: String::new(),
            bazel_apt_pkgs: default_bazel_apt_pkgs(),
            bazel_root_path: default_bazel_root_path(),
            encap_rsync_url: String::new(),
        }
    }
}

fn default_build_type() -> String {
    DEFAULT_BUILD_TYPE.to_string()
}

fn default_server_url() -> Url {
    Url::parse(DEFAULT_SERVER_URL).expect("default server URL is valid")
}

fn default_release() -> String {
    DEFAULT_LXC_RELEASE.to_string()
}

fn default_bazel_apt_pkgs() -> Vec<String> {
    vec!["bazel".to_string()]
}

fn default_bazel_root_path() -> String {
    "/var/cache/bazel".to_string()
}

fn default_build_types() -> BTreeMap<String, BuildDescription> {
    let mut types = BTreeMap::new();
    types.insert(DEFAULT_BUILD_TYPE.to_string(), BuildDescription::default());
    types
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_build_type: default_build_type(),
            server_url: default_server_url(),
            snapshot_bucket: String::new(),
            limits: ResourceLimits::default(),
            lxc: LxcDefaults::default(),
            packages: PackageSettings::default(),
            clusters: BTreeMap::new(),
            build_types: default_build_types(),
        }
    }
}

impl Settings {
    /// Load settings from the config directory
    ///
    /// A missing file gives the default settings.
    pub fn load(dirs: &BuildplanDirs) -> Result<Self, SettingsError> {
        Self::load_from_path(&dirs.settings_path())
    }

    /// Load settings from a specific path
    ///
    /// A missing file gives the default settings; an unreadable, unparsable
    /// or invalid one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate settings from TOML content
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content).map_err(|e| SettingsError::ParseError {
            path: "<inline>".into(),
            error: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate every build type, the default build type and the limits
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, desc) in &self.build_types {
            desc.validate(name)?;
        }

        if !self.build_types.contains_key(&self.default_build_type) {
            return Err(SettingsError::UnknownBuildType {
                name: self.default_build_type.clone(),
            });
        }

        let limits = &self.limits;
        if limits.max_cpus_per_executor == 0 {
            return Err(SettingsError::InvalidLimits {
                message: "max_cpus_per_executor must be at least 1".to_string(),
            });
        }
        if limits.min_mem_mb_per_executor == 0 {
            return Err(SettingsError::InvalidLimits {
                message: "min_mem_mb_per_executor must be at least 1".to_string(),
            });
        }
        if limits.min_mem_mb_per_executor > limits.max_mem_mb_per_executor {
            return Err(SettingsError::InvalidLimits {
                message: format!(
                    "min_mem_mb_per_executor ({}) exceeds max_mem_mb_per_executor ({})",
                    limits.min_mem_mb_per_executor, limits.max_mem_mb_per_executor
                ),
            });
        }

        Ok(())
    }

    /// Look up a build description by name
    pub fn build_desc(&self, build_type: &str) -> Result<&BuildDescription, SettingsError> {
        self.build_types
            .get(build_type)
            .ok_or_else(|| SettingsError::UnknownBuildType {
                name: build_type.to_string(),
            })
    }

    /// Master URLs configured for a cluster
    pub fn master_urls(&self, cluster: &str) -> Option<&[String]> {
        self.clusters
            .get(cluster)
            .map(Vec::as_slice)
            .filter(|urls| !urls.is_empty())
    }

    /// Callback URL of the server API handed to clients
    pub fn server_api_url(&self) -> String {
        let base = self.server_url.as_str().trim_end_matches('/');
        format!("{base}{API_PATH}")
    }
}
