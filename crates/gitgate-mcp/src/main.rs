//! Git MCP Gateway
//!
//! # Usage
//!
//! ```bash
//! gitgate-mcp serve -r ~/src/app -r ~/src/lib [--mode libgit2] [--write-access]
//! gitgate-mcp setup -r ~/src/app --tool cline --auto-approve allow-read-only
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `gitgate=info`)
//! - `GITGATE_CONFIG`: Configuration file used when `--config` is absent
//!
//! # Protocol
//!
//! The server communicates via JSON-RPC 2.0 over stdio:
//! - Requests/responses go through stdout
//! - Logs go to stderr (to avoid interfering with the protocol)

use std::sync::Arc;

use clap::Parser;
use gitgate_mcp::cli::{Cli, Commands};
use gitgate_mcp::{GitMcpServer, ServerConfig, setup};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "gitgate=debug" } else { "gitgate=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => {
            let config = ServerConfig::from_args(&args)?;
            tracing::info!(
                repositories = config.repositories.len(),
                backend = %config.backend,
                write_access = config.write_access,
                "Starting gitgate-mcp server"
            );
            let server = Arc::new(GitMcpServer::new(config.build_gateway()));
            server.run().await?;
        }
        Commands::Setup(args) => setup::run(&args)?,
    }

    Ok(())
}
