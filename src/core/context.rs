//! Runtime context of a job step
//!
//! Read-only records of the project, repository, job, job step and source a
//! build runs for. The translator reads them and never writes back.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Project the job belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project id
    pub id: Uuid,
    /// URL-safe project name
    pub slug: String,
}

/// Version control backend of a repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VcsBackend {
    /// Git
    Git,
    /// Mercurial
    Hg,
    /// Backend not known to this system
    #[default]
    Unknown,
}

impl VcsBackend {
    /// Backend name as sent to the scheduler
    pub fn name(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Hg => "hg",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VcsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Repository the project builds from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository id
    pub id: Uuid,
    /// Stored clone URL
    pub url: String,
    /// VCS backend
    #[serde(default)]
    pub backend: VcsBackend,
    /// Local checkout, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
}

/// Job being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job id
    pub id: Uuid,
}

/// Job step the commands are materialized for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStep {
    /// Job step id
    pub id: Uuid,
}

/// What is being built: a commit, or a commit plus a patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Base revision
    pub revision_sha: String,
    /// Patch applied on top of the revision, for diff builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_id: Option<Uuid>,
}

impl Source {
    /// Whether the source is a plain commit (no patch)
    pub fn is_commit(&self) -> bool {
        self.patch_id.is_none()
    }
}

/// Everything the translator needs to know about a job step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobContext {
    /// Project
    pub project: Project,
    /// Repository
    pub repository: Repository,
    /// Job
    pub job: Job,
    /// Job step
    pub jobstep: JobStep,
    /// Source
    pub source: Source,
}
