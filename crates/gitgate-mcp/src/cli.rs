//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gitgate_git::BackendKind;

/// Git MCP Gateway - expose Git operations on allow-listed repositories
#[derive(Parser, Debug)]
#[command(name = "gitgate-mcp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the MCP server on stdio
    Serve(ServeArgs),

    /// Install the server binary and register it with an AI assistant
    ///
    /// Examples:
    ///   gitgate-mcp setup -r ~/src/project
    ///   gitgate-mcp setup --tool cline,roo-code --auto-approve allow-read-only
    Setup(SetupArgs),
}

/// Options shared by `serve` and `setup`. Flags extend or override the
/// configuration file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ServeArgs {
    /// Git repository path (repeatable)
    #[arg(short = 'r', long = "repository")]
    pub repositories: Vec<PathBuf>,

    /// Git backend: 'shell' or 'libgit2'
    #[arg(long)]
    pub mode: Option<BackendKind>,

    /// Enable write access for remote operations (push)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub write_access: Option<bool>,

    /// git executable used by the shell backend
    #[arg(long)]
    pub git_binary: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "GITGATE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SetupArgs {
    #[command(flatten)]
    pub server: ServeArgs,

    /// Assistant(s) to configure, comma-separated (cline, roo-code)
    #[arg(long, default_value = "cline")]
    pub tool: String,

    /// Tools to auto-approve: a comma-separated list, 'allow-read-only'
    /// or 'allow-local-only'
    #[arg(long)]
    pub auto_approve: Option<String>,
}
