//! JSON-RPC 2.0 Types
//!
//! Envelopes for JSON-RPC 2.0 as used by MCP.
//! Per MCP 2025-06-18 schema lines 947-1050.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ErrorData;

/// JSON-RPC version constant - always "2.0".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str("2.0")
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == "2.0" {
            Ok(JsonRpcVersion)
        } else {
            Err(serde::de::Error::custom(format!(
                "expected JSON-RPC version '2.0', got '{}'",
                s
            )))
        }
    }
}

/// Request ID - can be a string or integer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

/// An incoming JSON-RPC request or notification.
///
/// Requests carry an `id` and expect a reply; notifications do not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcMessage {
    pub jsonrpc: JsonRpcVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcMessage {
    /// Create a request with params.
    pub fn request(id: impl Into<RequestId>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id: Some(id.into()),
            method: method.into(),
            params: Some(params),
        }
    }

    /// Create a notification (no id).
    pub fn notification(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id: None,
            method: method.into(),
            params: None,
        }
    }

    /// Returns true if this is a notification (no id).
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// An outgoing JSON-RPC reply: either a result or an error.
///
/// `id` is `None` only for errors raised before a request id could be read
/// (parse errors), which serialize as `"id": null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcReply {
    Success {
        jsonrpc: JsonRpcVersion,
        id: RequestId,
        result: Value,
    },
    Error {
        jsonrpc: JsonRpcVersion,
        id: Option<RequestId>,
        error: ErrorData,
    },
}

impl JsonRpcReply {
    pub fn success(id: RequestId, result: Value) -> Self {
        JsonRpcReply::Success {
            jsonrpc: JsonRpcVersion,
            id,
            result,
        }
    }

    pub fn error(id: Option<RequestId>, error: ErrorData) -> Self {
        JsonRpcReply::Error {
            jsonrpc: JsonRpcVersion,
            id,
            error,
        }
    }

    /// Build the reply for a dispatch outcome.
    pub fn from_result(id: RequestId, result: Result<Value, ErrorData>) -> Self {
        match result {
            Ok(value) => Self::success(id, value),
            Err(error) => Self::error(Some(id), error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcReply::Error { .. })
    }
}
