//! Streamable HTTP Transport
//!
//! Stateless flavour of the MCP Streamable HTTP transport: every POST carries
//! one JSON-RPC message and gets its reply in the response body.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::McpState;
use crate::types::error::ErrorData;
use crate::types::jsonrpc::{JsonRpcMessage, JsonRpcReply, RequestId};
use crate::Handler;

/// Handle one Streamable HTTP POST.
///
/// 1. Parse the body as a JSON-RPC message
/// 2. Notifications get 202 Accepted and no body
/// 3. Requests are dispatched and answered with 200 and the reply
#[tracing::instrument(skip_all)]
pub async fn streamable_handler<H: Handler>(
    State(state): State<Arc<McpState<H>>>,
    body: Bytes,
) -> Response {
    let value: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            let reply = JsonRpcReply::error(None, ErrorData::parse_error(format!("Parse error: {}", e)));
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    // Keep the id, if readable, so a malformed request can still be correlated.
    let request_id = value
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    let message: JsonRpcMessage = match serde_json::from_value(value) {
        Ok(m) => m,
        Err(e) => {
            let reply = JsonRpcReply::error(
                request_id,
                ErrorData::invalid_request(format!("Invalid JSON-RPC: {}", e)),
            );
            return (StatusCode::BAD_REQUEST, Json(reply)).into_response();
        }
    };

    tracing::debug!(
        method = %message.method,
        notification = message.is_notification(),
        "Processing MCP message (streamable)"
    );

    match crate::protocol::respond(&state, &message).await {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
