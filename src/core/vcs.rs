//! Version control seam
//!
//! The translator only needs a repository's remote URL. History queries are
//! part of the same seam so that every backend answers them the same way.

use serde::{Deserialize, Serialize};

use crate::core::context::VcsBackend;
use crate::error::VcsError;

/// One revision of a repository's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Full revision id
    pub id: String,
    /// Author name and email
    pub author: String,
    /// Commit message
    pub message: String,
    /// Parent revision ids
    pub parents: Vec<String>,
    /// Commit time, seconds since the epoch
    pub timestamp: i64,
}

/// Read access to a repository
pub trait Vcs {
    /// Backend of the repository
    fn backend(&self) -> VcsBackend;

    /// Remote URL the repository fetches from
    fn remote_url(&self) -> Result<String, VcsError>;

    /// Most recent revisions first, at most `limit`
    ///
    /// Each call walks the history again from the tip.
    fn log(&self, limit: usize) -> Result<Vec<Revision>, VcsError>;

    /// Whether `parent` is a direct parent of `child`
    fn is_child_parent(&self, child: &str, parent: &str) -> Result<bool, VcsError>;
}
