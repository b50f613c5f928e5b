//! Repository-scoped command gateway
//!
//! This crate decides *whether* and *where* a git tool call may run, then
//! hands it to a [`gitgate_git::GitBackend`]:
//!
//! - **Registry**: the append-only set of repositories the server manages
//! - **Path guard**: resolves requested paths and enforces containment
//! - **Catalog**: the fixed tool set, risk tiers and argument lists
//! - **Requests**: per-tool typed arguments decoded from JSON
//! - **Gateway**: validation, dispatch and result framing
//!
//! ```text
//!   tool name + args
//!          |
//!       Gateway ---- PathGuard ---- RepositoryRegistry
//!          |
//!     GitBackend (shell | libgit2)
//! ```

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod path;
pub mod registry;
pub mod request;

pub use catalog::{
    ArgKind, RepoPathRule, RiskTier, ToolArgument, ToolName, advertised_tools,
    local_only_tool_names, read_only_tool_names,
};
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use guard::PathGuard;
pub use registry::RepositoryRegistry;
pub use request::ToolRequest;
