//! VCS backend selection

use crate::core::context::{Repository, VcsBackend};
use crate::core::vcs::Vcs;
use crate::infra::git::GitVcs;

/// Open a VCS for `repository`
///
/// Returns `None` when there is no local checkout, the backend is not
/// supported, or the checkout cannot be opened. Callers then use the
/// repository's stored URL.
pub fn open(repository: &Repository) -> Option<Box<dyn Vcs>> {
    let path = repository.local_path.as_deref()?;

    match repository.backend {
        VcsBackend::Git => match GitVcs::open(path) {
            Ok(vcs) => Some(Box::new(vcs)),
            Err(e) => {
                tracing::warn!("Could not open repository {}: {e}", repository.id);
                None
            }
        },
        VcsBackend::Hg | VcsBackend::Unknown => {
            tracing::debug!(
                "No {} support for repository {}",
                repository.backend,
                repository.id
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn repository(backend: VcsBackend, local_path: Option<std::path::PathBuf>) -> Repository {
        Repository {
            id: Uuid::new_v4(),
            url: "https://example.com/repo.git".to_string(),
            backend,
            local_path,
        }
    }

    #[test]
    fn test_no_checkout_gives_none() {
        assert!(open(&repository(VcsBackend::Git, None)).is_none());
    }

    #[test]
    fn test_unsupported_backend_gives_none() {
        let temp = TempDir::new().unwrap();
        let repo = repository(VcsBackend::Hg, Some(temp.path().to_path_buf()));
        assert!(open(&repo).is_none());
    }

    #[test]
    fn test_broken_checkout_gives_none() {
        let temp = TempDir::new().unwrap();
        let repo = repository(VcsBackend::Git, Some(temp.path().join("missing")));
        assert!(open(&repo).is_none());
    }
}
