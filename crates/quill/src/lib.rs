//! quill - MCP document-conversion gateway
//!
//! Exposes one tool, `convert-contents`, over MCP. Conversion itself is done
//! by a remote pandoc host service; quill validates the call, forwards it,
//! and turns the reply into a text result, saving files when asked.

pub mod backend;
pub mod commands;
pub mod error;
pub mod format;
pub mod handler;
pub mod persist;
pub mod reconcile;
pub mod request;
pub mod serve;
pub mod stdio;
pub mod telemetry;
pub mod tool;

pub use backend::{BackendClient, BackendReply};
pub use error::ConvertError;
pub use format::Format;
pub use handler::ConvertHandler;
pub use request::ConversionRequest;
pub use tool::TOOL_NAME;
