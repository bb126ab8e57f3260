//! MCP handler exposing the `convert-contents` tool.
//!
//! Each call runs validate -> POST to host -> reconcile -> (maybe) save, with
//! nothing shared between calls beyond the immutable HTTP client.

use std::time::Instant;

use async_trait::async_trait;
use baton::{CallToolResult, ErrorData, Handler, Implementation, Tool};
use quillconf::BackendConfig;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::backend::BackendClient;
use crate::error::ConvertError;
use crate::reconcile::reconcile;
use crate::request::ConversionRequest;
use crate::tool::{self, TOOL_NAME};

pub struct ConvertHandler {
    tool: Tool,
    /// `None` when no backend URL is configured; calls then fail, listing still works.
    client: Option<BackendClient>,
}

impl ConvertHandler {
    pub fn new(config: &BackendConfig) -> Self {
        let client = match BackendClient::new(config) {
            Ok(client) => {
                info!(endpoint = %client.endpoint(), timeout_ms = config.timeout_ms, "Backend configured");
                Some(client)
            }
            Err(e) => {
                warn!(error = %e, "Conversions will fail until the backend URL is configured");
                None
            }
        };

        Self {
            tool: tool::descriptor(),
            client,
        }
    }

    /// Run one conversion end to end and return the tool's text result.
    ///
    /// Arguments are validated before the backend URL is checked.
    pub async fn convert(&self, arguments: &Value) -> Result<String, ConvertError> {
        let request = ConversionRequest::from_arguments(arguments)?;
        let client = self.client.as_ref().ok_or_else(ConvertError::missing_backend_url)?;

        let reply = client.convert(&request).await?;
        reconcile(reply, &request).await
    }
}

#[async_trait]
impl Handler for ConvertHandler {
    fn tools(&self) -> Vec<Tool> {
        vec![self.tool.clone()]
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ErrorData> {
        if name != TOOL_NAME {
            warn!(tool = %name, "Unknown tool requested");
            return Err(ConvertError::ToolNotFound(name.to_string()).into());
        }

        let start = Instant::now();
        let output_file = arguments.get("output_file").and_then(Value::as_str).unwrap_or("");

        match self.convert(&arguments).await {
            Ok(text) => {
                info!(
                    tool = %name,
                    output_file,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Conversion succeeded"
                );
                Ok(CallToolResult::text(text))
            }
            Err(e) => {
                if e.is_validation() {
                    warn!(tool = %name, kind = e.kind(), error = %e, "Rejected conversion request");
                } else {
                    error!(
                        tool = %name,
                        kind = e.kind(),
                        output_file,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Conversion failed"
                    );
                }
                Err(e.into())
            }
        }
    }

    fn server_info(&self) -> Implementation {
        Implementation::new("quill", env!("CARGO_PKG_VERSION")).with_title("Quill document conversion")
    }

    fn instructions(&self) -> Option<String> {
        Some(
            "Use convert-contents to convert text between document formats via pandoc. \
             Binary outputs (pdf, docx, epub) must be saved with an absolute output_file."
                .to_string(),
        )
    }
}
