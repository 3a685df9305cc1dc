//! Job files
//!
//! A job file is a JSON document describing one job step: its context, the
//! job plan, the project's stored configuration and the snapshot images the
//! store knows about. The CLI reads one per invocation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::core::context::JobContext;
use crate::core::jobplan::JobPlan;
use crate::core::snapshot::SnapshotImage;
use crate::error::BuildplanError;
use crate::infra::memory_store::MemoryStore;

/// One job step, as read from disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFile {
    /// Job step context
    pub context: JobContext,

    /// Job plan
    pub plan: JobPlan,

    /// Project configuration mapping
    #[serde(default)]
    pub project_config: Map<String, Value>,

    /// Known snapshot images
    #[serde(default)]
    pub snapshots: Vec<SnapshotImage>,
}

impl JobFile {
    /// Read and parse a job file
    pub fn load(path: &Path) -> Result<Self, BuildplanError> {
        let content = fs::read_to_string(path).map_err(|e| BuildplanError::InvalidJobFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| BuildplanError::InvalidJobFile {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Store holding the file's project configuration and snapshot images
    pub fn store(&self) -> MemoryStore {
        self.snapshots.iter().fold(
            MemoryStore::new()
                .with_project_config(self.context.project.id, self.project_config.clone()),
            |store, image| store.with_image(*image),
        )
    }
}
