//! raycast-mcp
//!
//! Usage:
//!   raycast-mcp
//!
//! The server communicates over stdio using JSON-RPC 2.0. Logs go to stderr;
//! `RUST_LOG` overrides the configured `log_level`.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use raycast_core::{Config, CredentialStore};
use raycast_mcp::{Dispatcher, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Initialize logging to stderr (stdout is for MCP protocol)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting raycast-mcp server");

    let credentials = config.credentials_path();
    let auth = CredentialStore::load(&credentials)
        .with_context(|| format!("Failed to load credentials: {}", credentials.display()))?;

    let dispatcher = Dispatcher::from_config(&config, Arc::new(auth));
    let mut server = McpServer::new(dispatcher);
    server.run().await?;

    Ok(())
}
