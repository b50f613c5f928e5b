//! Shared test utilities for the gitgate workspace.
//!
//! This crate provides git fixtures used by the backend, gateway and server
//! test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`] - free functions that shape real repositories with the `git` CLI
//! - [`repo`] - [`TestRepo`](repo::TestRepo), a temporary repository with helpers

pub mod git;
pub mod repo;
