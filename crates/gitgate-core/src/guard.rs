//! Resolution of requested repository paths against the registry.

use std::path::PathBuf;
use std::sync::Arc;

use crate::path::{absolutize, has_git_metadata};
use crate::registry::RepositoryRegistry;
use crate::{GatewayError, Result};

/// Sole gate between a caller-supplied path and the filesystem.
#[derive(Debug, Clone)]
pub struct PathGuard {
    registry: Arc<RepositoryRegistry>,
}

impl PathGuard {
    pub fn new(registry: Arc<RepositoryRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<RepositoryRegistry> {
        &self.registry
    }

    /// Resolve `requested` to an absolute path inside a registered repository.
    ///
    /// `None` and `""` both select the default repository.
    pub fn resolve(&self, requested: Option<&str>) -> Result<PathBuf> {
        let requested = match requested {
            Some(p) if !p.is_empty() => p,
            _ => {
                return self
                    .registry
                    .default_repository()
                    .ok_or(GatewayError::NoDefaultRepository);
            }
        };

        let path = absolutize(requested).map_err(|e| GatewayError::InvalidPath {
            path: requested.to_string(),
            reason: e.to_string(),
        })?;

        let Some(root) = self.registry.containing_root(&path) else {
            tracing::warn!(path = %path.display(), "Rejected path outside registered repositories");
            return Err(GatewayError::AccessDenied { path });
        };

        if !has_git_metadata(&path, &root) {
            return Err(GatewayError::NotAGitRepository { path });
        }

        Ok(path)
    }

    /// Resolve the destination of an init. Not checked against the registry,
    /// since the repository does not exist yet.
    pub fn resolve_init_target(&self, requested: Option<&str>) -> Result<PathBuf> {
        let requested = requested.filter(|p| !p.is_empty()).ok_or_else(|| {
            GatewayError::invalid_argument(
                "git_init",
                "repo_path must be specified for initialization",
            )
        })?;

        absolutize(requested).map_err(|e| GatewayError::InvalidPath {
            path: requested.to_string(),
            reason: e.to_string(),
        })
    }
}
