//! The set of repositories the gateway may operate on.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::path::{absolutize, display_name, is_repository_root, is_within};

/// Append-only list of absolute repository roots.
///
/// The first entry is the default repository. Reads may run concurrently;
/// [`append`](Self::append) takes the write lock.
#[derive(Debug, Default)]
pub struct RepositoryRegistry {
    roots: RwLock<Vec<PathBuf>>,
}

impl RepositoryRegistry {
    /// Build a registry from configured candidates.
    ///
    /// Candidates that cannot be resolved or are not git working trees are
    /// dropped with a warning; duplicates keep their first position.
    pub fn new<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            roots: RwLock::new(normalize(candidates)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<PathBuf>> {
        self.roots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<PathBuf>> {
        self.roots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Repository used when a request names none.
    pub fn default_repository(&self) -> Option<PathBuf> {
        self.read().first().cloned()
    }

    /// Copy of the current roots, in registration order.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, root: &Path) -> bool {
        self.read().iter().any(|r| r == root)
    }

    /// Track one more repository root. Returns `false` if it was already known.
    ///
    /// The caller is responsible for `root` being absolute and initialised.
    pub fn append(&self, root: PathBuf) -> bool {
        let mut roots = self.write();
        if roots.contains(&root) {
            return false;
        }
        tracing::info!(path = %root.display(), "Registered repository");
        roots.push(root);
        true
    }

    /// The most specific registered root that contains `path`.
    pub fn containing_root(&self, path: &Path) -> Option<PathBuf> {
        self.read()
            .iter()
            .filter(|root| is_within(path, root))
            .max_by_key(|root| root.components().count())
            .cloned()
    }

    /// Human-readable listing with basenames as labels.
    pub fn describe(&self) -> String {
        let roots = self.read();
        if roots.is_empty() {
            return "No repositories configured".to_string();
        }

        let mut out = format!("Available repositories ({}):\n\n", roots.len());
        for (i, root) in roots.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} ({})\n",
                i + 1,
                display_name(root),
                root.display()
            ));
        }
        out
    }
}

/// Resolve, validate and de-duplicate repository candidates, keeping order.
pub fn normalize<I, P>(candidates: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut roots: Vec<PathBuf> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate.as_os_str().is_empty() {
            continue;
        }

        let root = match absolutize(candidate) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!(path = %candidate.display(), error = %e, "Failed to resolve repository path");
                continue;
            }
        };

        if !is_repository_root(&root) {
            tracing::warn!(path = %root.display(), "Not a git repository, skipping");
            continue;
        }

        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn fake_repo(base: &Path, name: &str) -> PathBuf {
        let root = base.join(name);
        fs::create_dir_all(root.join(".git")).unwrap();
        root
    }

    #[test]
    fn normalize_drops_invalid_and_duplicate_candidates() {
        let temp = TempDir::new().unwrap();
        let a = fake_repo(temp.path(), "a");
        let b = fake_repo(temp.path(), "b");
        let plain = temp.path().join("plain");
        fs::create_dir_all(&plain).unwrap();

        let roots = normalize([
            a.clone(),
            plain,
            temp.path().join("missing"),
            PathBuf::new(),
            b.join("..").join("b"),
            a.clone(),
        ]);
        assert_eq!(roots, vec![a, b]);
    }

    #[test]
    fn first_surviving_entry_is_default() {
        let temp = TempDir::new().unwrap();
        let b = fake_repo(temp.path(), "b");
        let registry = RepositoryRegistry::new([temp.path().join("nope"), b.clone()]);
        assert_eq!(registry.default_repository(), Some(b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn append_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let a = fake_repo(temp.path(), "a");
        let registry = RepositoryRegistry::default();
        assert!(registry.is_empty());

        assert!(registry.append(a.clone()));
        assert!(!registry.append(a.clone()));
        assert_eq!(registry.snapshot(), vec![a]);
    }

    #[test]
    fn containing_root_prefers_deepest() {
        let temp = TempDir::new().unwrap();
        let outer = fake_repo(temp.path(), "outer");
        let inner = fake_repo(&outer, "vendor/inner");
        let registry = RepositoryRegistry::new([outer.clone(), inner.clone()]);

        assert_eq!(registry.containing_root(&inner.join("src")), Some(inner));
        assert_eq!(registry.containing_root(&outer.join("src")), Some(outer));
        assert_eq!(registry.containing_root(temp.path()), None);
    }

    #[test]
    fn describe_lists_basenames() {
        let temp = TempDir::new().unwrap();
        let a = fake_repo(temp.path(), "alpha");
        let registry = RepositoryRegistry::new([a.clone()]);

        assert_eq!(
            registry.describe(),
            format!("Available repositories (1):\n\n1. alpha ({})\n", a.display())
        );
        assert_eq!(
            RepositoryRegistry::default().describe(),
            "No repositories configured"
        );
    }
}
