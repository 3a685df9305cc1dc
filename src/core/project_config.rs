//! Typed view of a project's configuration
//!
//! Projects store their configuration as a flat key/value mapping
//! (`bazel.targets`, `bazel.cpus`, ...). This module reads the keys the
//! compiler understands into typed structs, once, and reports which key is
//! malformed when one is.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::defaults::{DEFAULT_CPUS, DEFAULT_MAX_EXECUTORS, DEFAULT_MEM_MB};
use crate::error::ProjectConfigError;

/// Project configuration keys
pub mod keys {
    /// Bazel target patterns
    pub const BAZEL_TARGETS: &str = "bazel.targets";
    /// Dependency groups keyed by provider
    pub const BAZEL_DEPENDENCIES: &str = "bazel.dependencies";
    /// Test tags to exclude
    pub const BAZEL_EXCLUDE_TAGS: &str = "bazel.exclude-tags";
    /// CPUs per executor
    pub const BAZEL_CPUS: &str = "bazel.cpus";
    /// Memory per executor in MiB
    pub const BAZEL_MEM: &str = "bazel.mem";
    /// Executor fan-out
    pub const BAZEL_MAX_EXECUTORS: &str = "bazel.max-executors";
    /// Paths whose changes never trigger a build
    pub const FILE_BLACKLIST: &str = "build.file-blacklist";
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Autogenerated bazel build settings
    pub bazel: BazelConfig,

    /// Paths whose changes never trigger a build
    pub file_blacklist: Vec<String>,
}

/// Settings for autogenerated bazel builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BazelConfig {
    /// Target patterns, in declaration order
    pub targets: Vec<String>,

    /// Dependencies to sync before collecting targets
    pub dependencies: Dependencies,

    /// Test tags to exclude, in declaration order
    pub exclude_tags: Vec<String>,

    /// Requested CPUs per executor (unvalidated)
    pub cpus: i64,

    /// Requested memory per executor in MiB (unvalidated)
    pub mem_mb: i64,

    /// Requested executor fan-out (unvalidated)
    pub max_executors: i64,
}

/// Dependency groups, one per provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependencies {
    /// Encap packages synced with rsync
    #[serde(default)]
    pub encap: Vec<String>,
}

impl Default for BazelConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            dependencies: Dependencies::default(),
            exclude_tags: Vec::new(),
            cpus: DEFAULT_CPUS,
            mem_mb: DEFAULT_MEM_MB,
            max_executors: DEFAULT_MAX_EXECUTORS,
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            bazel: BazelConfig::default(),
            file_blacklist: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Read the typed configuration from a project's key/value mapping
    ///
    /// Missing and null keys take their defaults; unknown keys are ignored.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ProjectConfigError> {
        let defaults = BazelConfig::default();

        let bazel = BazelConfig {
            targets: read(map, keys::BAZEL_TARGETS)?.unwrap_or_default(),
            dependencies: read(map, keys::BAZEL_DEPENDENCIES)?.unwrap_or_default(),
            exclude_tags: read(map, keys::BAZEL_EXCLUDE_TAGS)?.unwrap_or_default(),
            cpus: read(map, keys::BAZEL_CPUS)?.unwrap_or(defaults.cpus),
            mem_mb: read(map, keys::BAZEL_MEM)?.unwrap_or(defaults.mem_mb),
            max_executors: read(map, keys::BAZEL_MAX_EXECUTORS)?
                .unwrap_or(defaults.max_executors),
        };

        Ok(Self {
            bazel,
            file_blacklist: read(map, keys::FILE_BLACKLIST)?.unwrap_or_default(),
        })
    }
}

fn read<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<T>, ProjectConfigError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ProjectConfigError::InvalidValue {
                key: key.to_string(),
                error: e.to_string(),
            }),
    }
}
