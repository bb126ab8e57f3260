//! MCP Protocol Dispatch
//!
//! Routes JSON-RPC methods to their handlers.
//!
//! Implements OpenTelemetry JSON-RPC semantic conventions for observability.
//! See: https://opentelemetry.io/docs/specs/semconv/rpc/json-rpc/

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;

use crate::transport::McpState;
use crate::types::error::ErrorData;
use crate::types::jsonrpc::{JsonRpcMessage, JsonRpcReply};
use crate::types::protocol::{
    Implementation, InitializeParams, InitializeResult, ServerCapabilities, PROTOCOL_VERSION,
};
use crate::types::tool::{CallToolParams, CallToolResult, ListToolsResult, Tool};

/// Handler trait for MCP tool servers.
///
/// The dispatcher owns the protocol; implementors only describe and run tools.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Return the list of available tools.
    fn tools(&self) -> Vec<Tool>;

    /// Execute a tool call.
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ErrorData>;

    /// Return server implementation info.
    fn server_info(&self) -> Implementation;

    /// Return instructions for the LLM.
    fn instructions(&self) -> Option<String> {
        None
    }

    /// Return server capabilities.
    fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities::default().enable_tools()
    }
}

/// Dispatch a message and build the reply to send back, if any.
///
/// Notifications never produce a reply, even when handling them fails.
pub async fn respond<H: Handler>(
    state: &McpState<H>,
    message: &JsonRpcMessage,
) -> Option<JsonRpcReply> {
    let result = dispatch(state, message).await;

    match &message.id {
        Some(id) => Some(JsonRpcReply::from_result(id.clone(), result)),
        None => {
            if let Err(error) = result {
                tracing::debug!(method = %message.method, %error, "Notification failed");
            }
            None
        }
    }
}

/// Dispatch a JSON-RPC message to the appropriate handler.
///
/// Creates a span following JSON-RPC semantic conventions:
/// - `rpc.system` = "jsonrpc"
/// - `rpc.method` = the JSON-RPC method name
/// - `rpc.jsonrpc.version` = "2.0"
/// - `rpc.jsonrpc.request_id` = the request ID (if present)
pub async fn dispatch<H: Handler>(
    state: &McpState<H>,
    message: &JsonRpcMessage,
) -> Result<Value, ErrorData> {
    let request_id = message
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    let span = tracing::info_span!(
        "mcp.dispatch",
        rpc.system = "jsonrpc",
        rpc.method = %message.method,
        rpc.jsonrpc.version = "2.0",
        rpc.jsonrpc.request_id = %request_id,
        error.type = tracing::field::Empty,
        rpc.jsonrpc.error_code = tracing::field::Empty,
        rpc.jsonrpc.error_message = tracing::field::Empty,
    );

    async {
        let result = dispatch_inner(state, message).await;

        if let Err(ref error) = result {
            record_error_on_span(error);
        }

        result
    }
    .instrument(span)
    .await
}

fn record_error_on_span(error: &ErrorData) {
    let span = tracing::Span::current();
    span.record("error.type", error_type_for_code(error.code));
    span.record("rpc.jsonrpc.error_code", error.code);
    span.record("rpc.jsonrpc.error_message", error.message.as_str());
}

/// Map JSON-RPC error codes to error.type values.
fn error_type_for_code(code: i32) -> &'static str {
    match code {
        ErrorData::PARSE_ERROR => "parse_error",
        ErrorData::INVALID_REQUEST => "invalid_request",
        ErrorData::METHOD_NOT_FOUND => "method_not_found",
        ErrorData::INVALID_PARAMS => "invalid_params",
        ErrorData::INTERNAL_ERROR => "internal_error",
        _ => "application_error",
    }
}

async fn dispatch_inner<H: Handler>(
    state: &McpState<H>,
    message: &JsonRpcMessage,
) -> Result<Value, ErrorData> {
    match message.method.as_str() {
        // Lifecycle
        "initialize" => handle_initialize(state, message),
        "notifications/initialized" | "notifications/cancelled" => Ok(Value::Null),
        "ping" => Ok(serde_json::json!({})),

        // Tools
        "tools/list" => to_result(&ListToolsResult::all(state.handler.tools())),
        "tools/call" => handle_call_tool(state, message).await,

        _ => Err(ErrorData::method_not_found(&message.method)),
    }
}

fn handle_initialize<H: Handler>(
    state: &McpState<H>,
    request: &JsonRpcMessage,
) -> Result<Value, ErrorData> {
    let params: InitializeParams = parse_params(request, "initialize")?;

    tracing::info!(
        client = %params.client_info.name,
        client_version = %params.client_info.version,
        protocol_version = %params.protocol_version,
        "Client initialized"
    );

    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: state.handler.capabilities(),
        server_info: state.server_info.clone(),
        instructions: state.handler.instructions(),
    };

    to_result(&result)
}

async fn handle_call_tool<H: Handler>(
    state: &McpState<H>,
    request: &JsonRpcMessage,
) -> Result<Value, ErrorData> {
    let params: CallToolParams = parse_params(request, "call")?;

    let arguments = params
        .arguments
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    let tool_span = tracing::info_span!(
        "mcp.tool.call",
        mcp.tool.name = %params.name,
    );

    async {
        let result = state.handler.call_tool(&params.name, arguments).await?;
        to_result(&result)
    }
    .instrument(tool_span)
    .await
}

fn parse_params<T: serde::de::DeserializeOwned>(
    request: &JsonRpcMessage,
    what: &str,
) -> Result<T, ErrorData> {
    request
        .params
        .as_ref()
        .map(|p| serde_json::from_value(p.clone()))
        .transpose()
        .map_err(|e| ErrorData::invalid_params(format!("Invalid {} params: {}", what, e)))?
        .ok_or_else(|| ErrorData::invalid_params(format!("Missing {} params", what)))
}

fn to_result<T: Serialize>(result: &T) -> Result<Value, ErrorData> {
    serde_json::to_value(result)
        .map_err(|e| ErrorData::internal_error(format!("Failed to serialize result: {}", e)))
}
