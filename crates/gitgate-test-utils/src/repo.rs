//! [`TestRepo`] builder for gateway test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::git;

/// A temporary directory holding a real repository plus helpers for
/// shaping and inspecting it.
///
/// # Example
///
/// ```rust,no_run
/// use gitgate_test_utils::repo::TestRepo;
///
/// let repo = TestRepo::with_commit();
/// repo.write_file("new.txt", "hello");
/// assert_eq!(repo.current_branch(), "main");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
    path: PathBuf,
}

impl TestRepo {
    /// An empty repository on an unborn `main` branch.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("repo");
        git::real_git_repo(&path);
        Self { temp_dir, path }
    }

    /// A repository on `main` with one committed `README.md`.
    pub fn with_commit() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("repo");
        git::real_git_repo_with_commit(&path);
        Self { temp_dir, path }
    }

    /// A committed repository whose `origin` is a bare sibling already
    /// holding `main`.
    pub fn with_remote() -> Self {
        let repo = Self::with_commit();
        let remote = repo.temp_dir.path().join("remote.git");
        git::bare_remote(&repo.path, &remote);
        repo
    }

    /// Root of the working tree.
    pub fn root(&self) -> &Path {
        &self.path
    }

    /// A path inside the temp dir that is not part of the repository.
    pub fn outside(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Write `content` to `rel` (relative to the root), creating parents.
    pub fn write_file(&self, rel: &str, content: &str) {
        let full = self.path.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, content)
            .unwrap_or_else(|e| panic!("failed to write {}: {e}", full.display()));
    }

    /// Run `git <args>` in the repository.
    pub fn git(&self, args: &[&str]) -> String {
        git::git(&self.path, args)
    }

    pub fn current_branch(&self) -> String {
        git::current_branch(&self.path)
    }

    /// Number of commits reachable from HEAD.
    pub fn commit_count(&self) -> usize {
        self.git(&["rev-list", "--count", "HEAD"])
            .trim()
            .parse()
            .unwrap()
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
