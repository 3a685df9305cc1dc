//! In-memory plan store
//!
//! Backs the CLI and tests: snapshot images and project configurations are
//! loaded up front, persisted commands are kept in order.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::command::Command;
use crate::core::snapshot::SnapshotImage;
use crate::core::store::PlanStore;
use crate::error::StoreError;

/// Plan store held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    images: BTreeMap<Uuid, Uuid>,
    project_configs: BTreeMap<Uuid, Map<String, Value>>,
    commands: Vec<Command>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `image` for its job
    ///
    /// A job expects at most one image; a later image replaces an earlier one.
    #[must_use]
    pub fn with_image(mut self, image: SnapshotImage) -> Self {
        self.images.insert(image.job_id, image.id);
        self
    }

    /// Store a project's configuration mapping
    #[must_use]
    pub fn with_project_config(mut self, project_id: Uuid, config: Map<String, Value>) -> Self {
        self.project_configs.insert(project_id, config);
        self
    }

    /// Persisted commands, in persist order
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

impl PlanStore for MemoryStore {
    fn expected_image(&self, job_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(self.images.get(&job_id).copied())
    }

    /// Projects without a stored configuration have an empty mapping
    fn project_config(&self, project_id: Uuid) -> Result<Map<String, Value>, StoreError> {
        Ok(self
            .project_configs
            .get(&project_id)
            .cloned()
            .unwrap_or_default())
    }

    fn persist(&mut self, command: &Command) -> Result<(), StoreError> {
        self.commands.push(command.clone());
        Ok(())
    }
}
