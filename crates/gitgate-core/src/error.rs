//! Error types for gitgate-core

use std::path::PathBuf;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Everything that can go wrong between receiving a tool call and producing
/// its text.
///
/// None of these are transport faults: the protocol layer renders each one
/// as an error payload the caller can read.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The requested path cannot be made absolute
    #[error("Repository path error: invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The resolved path lies outside every registered repository
    #[error("Repository path error: access denied - path outside allowed repositories: {}", path.display())]
    AccessDenied { path: PathBuf },

    /// The resolved path has no git metadata between it and its repository root
    #[error("Repository path error: not a git repository: {}", path.display())]
    NotAGitRepository { path: PathBuf },

    /// No path was given and no repository is registered
    #[error("Repository path error: no repository specified and no defaults configured")]
    NoDefaultRepository,

    /// A required argument is missing or has the wrong type
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArgument { tool: String, message: String },

    /// The backend ran and git refused
    #[error("Failed to {action}: {source}")]
    Backend {
        action: &'static str,
        #[source]
        source: gitgate_git::Error,
    },

    /// Push was called while the server runs read/local only
    #[error("Write access is disabled. Use --write-access flag to enable remote operations.")]
    WriteAccessDisabled,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

impl GatewayError {
    pub fn invalid_argument(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Wrap a backend failure with the verb used in the error text.
    pub fn backend(action: &'static str) -> impl FnOnce(gitgate_git::Error) -> Self {
        move |source| Self::Backend { action, source }
    }

    /// Whether the failure happened while resolving the repository path.
    pub fn is_path_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. }
                | Self::AccessDenied { .. }
                | Self::NotAGitRepository { .. }
                | Self::NoDefaultRepository
        )
    }
}
