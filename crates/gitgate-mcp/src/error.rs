//! Error types for the MCP server

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving or setting up the server
#[derive(Debug, Error)]
pub enum Error {
    /// A tool call was refused or failed inside the gateway
    #[error(transparent)]
    Gateway(#[from] gitgate_core::GatewayError),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be read or parsed
    #[error("invalid configuration at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A blocking task panicked or was cancelled
    #[error("internal error: {0}")]
    Internal(String),

    /// No home directory to install into
    #[error("could not determine the user home directory")]
    HomeDirNotFound,

    /// `setup` was asked to configure an assistant it does not know
    #[error("unsupported tool: {0} (supported: cline, roo-code)")]
    UnsupportedTool(String),

    /// `setup` has no settings location for this platform
    #[error("unsupported OS: {0}")]
    UnsupportedPlatform(String),

    /// Writing assistant settings failed
    #[error("setup failed for {tool}: {message}")]
    Setup { tool: String, message: String },
}
