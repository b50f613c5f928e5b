//! Error types for gitgate-git

use std::path::PathBuf;

/// Result type for gitgate-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while executing a Git operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git command failed: {command} (exit code {code})\nOutput: {output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("HEAD is not a branch")]
    DetachedHead,

    #[error("Repository at {path} has no working directory")]
    BareRepository { path: PathBuf },

    #[error("pathspec '{pathspec}' did not match any files")]
    PathspecNotFound { pathspec: String },

    #[error("'{pathspec}' is outside repository")]
    OutsideRepository { pathspec: String },

    #[error("The following paths are ignored by one of your .gitignore files: {pathspec}")]
    PathIgnored { pathspec: String },

    #[error("nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
