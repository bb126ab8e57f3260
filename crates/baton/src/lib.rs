//! baton - MCP (Model Context Protocol) Library for Rust
//!
//! A small implementation of the MCP 2025-06-18 specification for servers
//! that expose tools. Two transports share one dispatcher:
//!
//! - **stdio**: newline-delimited JSON-RPC on stdin/stdout (Claude Code, LibreChat)
//! - **streamable HTTP**: `POST /` with a JSON-RPC body, mounted with axum
//!
//! # Server Example
//!
//! ```rust,ignore
//! use baton::{Handler, Tool, CallToolResult, Implementation};
//! use async_trait::async_trait;
//!
//! struct MyHandler;
//!
//! #[async_trait]
//! impl Handler for MyHandler {
//!     fn tools(&self) -> Vec<Tool> {
//!         vec![Tool::new("hello", "Say hello")]
//!     }
//!
//!     async fn call_tool(&self, name: &str, _args: serde_json::Value)
//!         -> Result<CallToolResult, baton::ErrorData>
//!     {
//!         Ok(CallToolResult::text("Hello!"))
//!     }
//!
//!     fn server_info(&self) -> Implementation {
//!         Implementation::new("my-server", "0.1.0")
//!     }
//! }
//!
//! let state = std::sync::Arc::new(baton::McpState::new(MyHandler));
//!
//! // Either serve stdin/stdout...
//! baton::transport::stdio::serve_stdio(state.clone()).await?;
//!
//! // ...or mount the HTTP router.
//! let router = baton::router(state);
//! ```

pub mod protocol;
pub mod transport;
pub mod types;

// Re-export commonly used types at crate root
pub use types::content::Content;
pub use types::error::ErrorData;
pub use types::jsonrpc::{JsonRpcMessage, JsonRpcReply, RequestId};
pub use types::protocol::{Implementation, ServerCapabilities};
pub use types::tool::{CallToolResult, Tool, ToolAnnotations, ToolSchema};

// Re-export protocol types
pub use protocol::Handler;

// Re-export transport types
pub use transport::{router, McpState, TransportError};
