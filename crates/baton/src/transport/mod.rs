//! MCP Transports
//!
//! ## stdio
//! - newline-delimited JSON-RPC on stdin, replies on stdout
//! - see [`stdio::serve`]
//!
//! ## Streamable HTTP (stateless)
//! - POST / - Send JSON-RPC request, receive response directly
//! - notifications are acknowledged with 202 and no body

pub mod stdio;
mod streamable;

pub use streamable::streamable_handler;

use axum::Router;
use std::sync::Arc;

use crate::types::protocol::Implementation;
use crate::Handler;

/// Shared state for MCP handlers.
pub struct McpState<H> {
    /// The application's tool handler.
    pub handler: Arc<H>,

    /// Server identity reported on initialize.
    pub server_info: Implementation,
}

impl<H: Handler> McpState<H> {
    /// Create new MCP state, taking the server identity from the handler.
    pub fn new(handler: H) -> Self {
        let server_info = handler.server_info();
        Self {
            handler: Arc::new(handler),
            server_info,
        }
    }
}

/// Errors that end a transport loop.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to read from transport: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write to transport: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Build an axum Router for the MCP Streamable HTTP transport.
///
/// Routes:
/// - POST / - JSON-RPC request/response
///
/// Mount it under a prefix with `Router::nest("/mcp", ...)`.
pub fn router<H>(state: Arc<McpState<H>>) -> Router
where
    H: Handler + 'static,
{
    Router::new()
        .route("/", axum::routing::post(streamable_handler::<H>))
        .with_state(state)
}
