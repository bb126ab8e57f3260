//! MCP Protocol Types
//!
//! The subset of the MCP 2025-06-18 schema needed by tool servers:
//!
//! - `jsonrpc` - JSON-RPC 2.0 envelopes (incoming messages, replies)
//! - `error` - error object with the standard JSON-RPC codes
//! - `protocol` - initialize handshake and capability negotiation
//! - `tool` - tool definitions and call results
//! - `content` - content blocks returned by tools

pub mod content;
pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod tool;
