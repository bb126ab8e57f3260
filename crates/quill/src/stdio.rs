//! MCP over stdin/stdout for Claude Code, LibreChat and other stdio clients.

use std::sync::Arc;

use anyhow::{Context, Result};
use quillconf::BackendConfig;
use tracing::info;

use crate::handler::ConvertHandler;

/// Serve until stdin closes. Requests still in flight are answered first.
pub async fn run(backend: &BackendConfig) -> Result<()> {
    let state = Arc::new(baton::McpState::new(ConvertHandler::new(backend)));

    info!("stdio MCP server running");

    baton::transport::stdio::serve_stdio(state)
        .await
        .context("stdio transport failed")?;

    info!("stdin closed, shutting down");
    Ok(())
}
