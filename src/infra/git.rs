//! Git repositories
//!
//! Read-only access to a local git checkout using the gix crate: the fetch
//! remote's URL, the history from `HEAD`, and parent queries.

use gix::remote::Direction;
use std::path::{Path, PathBuf};

use crate::core::context::VcsBackend;
use crate::core::vcs::{Revision, Vcs};
use crate::error::VcsError;

/// A local git checkout
pub struct GitVcs {
    path: PathBuf,
    repo: gix::Repository,
}

impl std::fmt::Debug for GitVcs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitVcs").field("path", &self.path).finish()
    }
}

impl GitVcs {
    /// Open the repository at `path`
    pub fn open(path: &Path) -> Result<Self, VcsError> {
        let repo = gix::open(path).map_err(|e| VcsError::InvalidRepository {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    fn parse_id(revision: &str) -> Result<gix::ObjectId, VcsError> {
        gix::ObjectId::from_hex(revision.as_bytes()).map_err(|e| VcsError::RevisionNotFound {
            revision: revision.to_string(),
            error: e.to_string(),
        })
    }

    fn revision(&self, id: gix::ObjectId) -> Result<Revision, VcsError> {
        let walk_failed = |e: &dyn std::fmt::Display| VcsError::WalkFailed {
            error: format!("{id}: {e}"),
        };

        let commit = self.repo.find_commit(id).map_err(|e| walk_failed(&e))?;
        let author = commit.author().map_err(|e| walk_failed(&e))?;
        let timestamp = commit.time().map_err(|e| walk_failed(&e))?.seconds;

        Ok(Revision {
            id: id.to_hex().to_string(),
            author: format!("{} <{}>", author.name, author.email),
            message: commit.message_raw_sloppy().to_string(),
            parents: commit
                .parent_ids()
                .map(|parent| parent.to_hex().to_string())
                .collect(),
            timestamp,
        })
    }
}

impl Vcs for GitVcs {
    fn backend(&self) -> VcsBackend {
        VcsBackend::Git
    }

    fn remote_url(&self) -> Result<String, VcsError> {
        let remote = self
            .repo
            .find_default_remote(Direction::Fetch)
            .ok_or_else(|| VcsError::InvalidRepository {
                path: self.path.clone(),
                error: "no fetch remote configured".to_string(),
            })?
            .map_err(|e| VcsError::InvalidRepository {
                path: self.path.clone(),
                error: e.to_string(),
            })?;

        let url = remote
            .url(Direction::Fetch)
            .ok_or_else(|| VcsError::InvalidRepository {
                path: self.path.clone(),
                error: "fetch remote has no URL".to_string(),
            })?;
        Ok(url.to_bstring().to_string())
    }

    fn log(&self, limit: usize) -> Result<Vec<Revision>, VcsError> {
        let head = self.repo.head_id().map_err(|e| VcsError::RevisionNotFound {
            revision: "HEAD".to_string(),
            error: e.to_string(),
        })?;
        let walk = head.ancestors().all().map_err(|e| VcsError::WalkFailed {
            error: e.to_string(),
        })?;

        let mut revisions = Vec::new();
        for info in walk.take(limit) {
            let info = info.map_err(|e| VcsError::WalkFailed {
                error: e.to_string(),
            })?;
            revisions.push(self.revision(info.id)?);
        }

        tracing::debug!("Read {} revisions from {}", revisions.len(), self.path.display());
        Ok(revisions)
    }

    fn is_child_parent(&self, child: &str, parent: &str) -> Result<bool, VcsError> {
        let child_id = Self::parse_id(child)?;
        let parent_id = Self::parse_id(parent)?;

        let commit = self
            .repo
            .find_commit(child_id)
            .map_err(|e| VcsError::RevisionNotFound {
                revision: child.to_string(),
                error: e.to_string(),
            })?;

        let is_parent = commit.parent_ids().any(|id| id.detach() == parent_id);
        Ok(is_parent)
    }
}
