//! Git execution backends for gitgate
//!
//! Every Git operation the gateway exposes goes through the [`GitBackend`]
//! capability trait. Two interchangeable implementations exist:
//!
//! - [`ShellBackend`] runs the `git` binary through [`GitCli`]
//! - [`Git2Backend`] links libgit2 and falls back to an owned
//!   [`ShellBackend`] for operations it does not perform natively
//!
//! The backend is chosen once at startup through [`BackendKind`].

pub mod backend;
pub mod error;
pub mod exec;
pub mod log;
pub mod native;
pub mod shell;

pub use backend::{BackendKind, CommitAuthor, GitBackend, build_backend};
pub use error::{Error, Result};
pub use exec::GitCli;
pub use native::Git2Backend;
pub use shell::ShellBackend;

/// Output marker shared by both backends when a push had nothing to send.
pub const UP_TO_DATE_MARKER: &str = "up-to-date";
