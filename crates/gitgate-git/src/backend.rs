//! Backend capability trait for git operations

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::{Error, Git2Backend, GitCli, Result, ShellBackend};

/// Identity used by backends that author commits themselves.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl Default for CommitAuthor {
    fn default() -> Self {
        Self {
            name: "Git MCP Gateway".to_string(),
            email: "gitgate@localhost".to_string(),
        }
    }
}

/// Which execution strategy serves git operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum BackendKind {
    /// Spawn the `git` binary for every operation.
    #[default]
    Shell,

    /// Use libgit2 where it has an equivalent, shell out otherwise.
    Libgit2,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shell" => Ok(BackendKind::Shell),
            "libgit2" | "git2" => Ok(BackendKind::Libgit2),
            _ => Err(Error::InvalidArgument {
                message: format!("unknown backend '{s}' (expected 'shell' or 'libgit2')"),
            }),
        }
    }
}

impl TryFrom<String> for BackendKind {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Shell => write!(f, "shell"),
            BackendKind::Libgit2 => write!(f, "libgit2"),
        }
    }
}

/// One method per git operation exposed by the gateway.
///
/// Every `repo` argument is an absolute path that already passed the
/// gateway's path guard. Implementations must keep their success messages
/// textually compatible so callers never need to know which one ran.
pub trait GitBackend: Send + Sync {
    /// The strategy this backend implements.
    fn kind(&self) -> BackendKind;

    fn status(&self, repo: &Path) -> Result<String>;

    fn diff_unstaged(&self, repo: &Path) -> Result<String>;

    fn diff_staged(&self, repo: &Path) -> Result<String>;

    /// Diff of the working tree against `target` (branch, tag or commit).
    fn diff(&self, repo: &Path, target: &str) -> Result<String>;

    /// Record the staged changes. The returned text names the new commit.
    fn commit(&self, repo: &Path, message: &str) -> Result<String>;

    /// Stage `files`, given relative to `repo`.
    fn add(&self, repo: &Path, files: &[String]) -> Result<String>;

    /// Unstage everything.
    fn reset(&self, repo: &Path) -> Result<String>;

    /// One rendered entry per commit, newest first. `max_count == 0` means all.
    fn log(&self, repo: &Path, max_count: usize) -> Result<Vec<String>>;

    /// Create `name` from `base`, or from HEAD when no base is given.
    fn create_branch(&self, repo: &Path, name: &str, base: Option<&str>) -> Result<String>;

    fn checkout(&self, repo: &Path, name: &str) -> Result<String>;

    fn show(&self, repo: &Path, revision: &str) -> Result<String>;

    /// Create the directory if needed and initialise a repository in it.
    fn init(&self, path: &Path) -> Result<String>;

    /// Push `branch` (default: current) to `remote` (default: origin).
    ///
    /// A push with nothing to send yields text containing
    /// [`UP_TO_DATE_MARKER`](crate::UP_TO_DATE_MARKER).
    fn push(&self, repo: &Path, remote: Option<&str>, branch: Option<&str>) -> Result<String>;

    fn apply_patch_from_string(&self, repo: &Path, patch: &str) -> Result<String>;

    fn apply_patch_from_file(&self, repo: &Path, patch_file: &Path) -> Result<String>;
}

/// Build the backend selected at startup.
pub fn build_backend(kind: BackendKind, cli: GitCli, author: CommitAuthor) -> Arc<dyn GitBackend> {
    tracing::info!(backend = %kind, git = %cli.program().display(), "Selected git backend");
    let shell = ShellBackend::new(cli);
    match kind {
        BackendKind::Shell => Arc::new(shell),
        BackendKind::Libgit2 => Arc::new(Git2Backend::new(shell, author)),
    }
}
