//! MCP server for the Git gateway
//!
//! Exposes the tools of [`gitgate_core::Gateway`] over the Model Context
//! Protocol, so that AI assistants can run Git operations on an allow-list
//! of repositories.
//!
//! # Architecture
//!
//! ```text
//! [ MCP Client (Cline/IDE) ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ gitgate-mcp (MCP Server) ]
//!        | (Rust API)
//!        v
//! [ gitgate-core (Registry, Path Guard, Dispatch) ]
//!        |
//!        v
//! [ gitgate-git (shell | libgit2) ]
//! ```
//!
//! The binary also carries a `setup` command that registers the server with
//! Cline or Roo Code.

pub mod cli;
pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod setup;
pub mod tools;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use server::GitMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, tool_definitions};
