//! Persistence seam
//!
//! The core never talks to a database. Snapshot lookups, project
//! configuration and materialized commands all go through [`PlanStore`].

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::command::Command;
use crate::error::StoreError;

/// Persistence collaborator of the builder
pub trait PlanStore {
    /// Snapshot image expected for a job, if one exists
    fn expected_image(&self, job_id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// Stored configuration mapping of a project
    fn project_config(&self, project_id: Uuid) -> Result<Map<String, Value>, StoreError>;

    /// Persist a materialized command
    fn persist(&mut self, command: &Command) -> Result<(), StoreError>;
}
