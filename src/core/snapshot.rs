//! Snapshot resolution
//!
//! A job may expect a snapshot image: a cached executor state built from
//! the step's setup and teardown only. When one is expected the main script
//! is replaced by the no-op `:` and the setup, teardown and build
//! description switch to the build mode's snapshot variants.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::defaults::NOOP_SCRIPT;
use crate::core::build_desc::BuildDescription;
use crate::core::store::PlanStore;
use crate::error::StoreError;

/// A cached executor image for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotImage {
    /// Image id
    pub id: Uuid,
    /// Job the image is expected for
    pub job_id: Uuid,
}

impl SnapshotImage {
    /// Image id as 32 lowercase hex characters
    pub fn hex(&self) -> String {
        self.id.simple().to_string()
    }
}

/// Looks up the image expected for a job
pub struct SnapshotResolver<'a, S: PlanStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PlanStore + ?Sized> SnapshotResolver<'a, S> {
    /// Resolve through `store`
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Image expected for `job_id`, if any
    ///
    /// Store failures are returned as-is.
    pub fn resolve(&self, job_id: Uuid) -> Result<Option<SnapshotImage>, StoreError> {
        let image = self
            .store
            .expected_image(job_id)?
            .map(|id| SnapshotImage { id, job_id });

        match image {
            Some(ref image) => tracing::debug!("Job {job_id} expects snapshot {}", image.hex()),
            None => tracing::debug!("No snapshot expected for job {job_id}"),
        }
        Ok(image)
    }
}

/// Scripts and build description a step is translated with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepScripts<'a> {
    /// Build description that decides the client parameters
    pub build_desc: &'a BuildDescription,
    /// Setup script
    pub setup: String,
    /// Main script
    pub script: String,
    /// Teardown script
    pub teardown: String,
}

/// What a snapshot build runs instead of the regular step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotVariants<'a> {
    /// Build description of the snapshot
    pub build_desc: &'a BuildDescription,
    /// Setup script of the snapshot
    pub setup: String,
    /// Teardown script of the snapshot
    pub teardown: String,
}

impl<'a> StepScripts<'a> {
    /// Apply an expected image
    ///
    /// Returns the scripts to translate and the snapshot id: the image hex,
    /// or an empty string when there is no image (scripts unchanged).
    pub fn with_snapshot(
        self,
        image: Option<&SnapshotImage>,
        variants: SnapshotVariants<'a>,
    ) -> (Self, String) {
        match image {
            Some(image) => (
                Self {
                    build_desc: variants.build_desc,
                    setup: variants.setup,
                    script: NOOP_SCRIPT.to_string(),
                    teardown: variants.teardown,
                },
                image.hex(),
            ),
            None => (self, String::new()),
        }
    }
}
