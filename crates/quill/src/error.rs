//! Conversion errors and their JSON-RPC mapping.

use std::path::PathBuf;

use baton::ErrorData;
use serde_json::json;
use thiserror::Error;

/// Generic server-side failure.
pub const SERVER_ERROR: i32 = -32000;

/// The pandoc host did not answer in time.
pub const TIMEOUT_ERROR: i32 = -32001;

/// Everything that can go wrong handling one `convert-contents` call.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid {field} '{value}'. Supported: {supported}")]
    UnsupportedFormat {
        field: &'static str,
        value: String,
        supported: String,
    },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Configuration Error: {0}")]
    Configuration(String),

    #[error("Connection timed out to host Pandoc service at {endpoint}. Is PANDOC_HOST_URL correct?")]
    BackendTimeout { endpoint: String },

    #[error("Could not reach host Pandoc service at {endpoint}: {reason}. Is it running and is PANDOC_HOST_URL correct?")]
    BackendUnreachable { endpoint: String, reason: String },

    #[error("Host Pandoc service error (status {status}): {message}")]
    BackendStatus { status: u16, message: String },

    #[error("Host Pandoc service returned an unusable reply: {0}")]
    InvalidBackendReply(String),

    #[error("Host service responded successfully but provided no usable content.")]
    EmptyBackendReply,

    #[error("Conversion to {format} succeeded on host, but 'output_file' was not specified to save the result.")]
    MissingOutputPath { format: String },

    #[error("Conversion via host succeeded, but failed to write output file '{}': {}", .path.display(), .source)]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// No backend endpoint is configured.
    pub fn missing_backend_url() -> Self {
        ConvertError::Configuration(
            "The required PANDOC_HOST_URL environment variable is not set. \
             Cannot connect to the host Pandoc service."
                .to_string(),
        )
    }

    /// Stable snake_case name, sent to clients as `error.data.kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::Validation(_) => "validation",
            ConvertError::UnsupportedFormat { .. } => "unsupported_format",
            ConvertError::ToolNotFound(_) => "tool_not_found",
            ConvertError::Configuration(_) => "configuration",
            ConvertError::BackendTimeout { .. } => "backend_timeout",
            ConvertError::BackendUnreachable { .. } => "backend_unreachable",
            ConvertError::BackendStatus { .. } => "backend_status",
            ConvertError::InvalidBackendReply(_) => "invalid_backend_reply",
            ConvertError::EmptyBackendReply => "empty_backend_reply",
            ConvertError::MissingOutputPath { .. } => "missing_output_path",
            ConvertError::Persistence { .. } => "persistence",
        }
    }

    /// JSON-RPC error code for this failure.
    pub fn code(&self) -> i32 {
        match self {
            ConvertError::Validation(_) | ConvertError::UnsupportedFormat { .. } => {
                ErrorData::INVALID_PARAMS
            }
            ConvertError::ToolNotFound(_) => ErrorData::METHOD_NOT_FOUND,
            ConvertError::BackendTimeout { .. } => TIMEOUT_ERROR,
            _ => SERVER_ERROR,
        }
    }

    /// True for caller mistakes, as opposed to backend or local faults.
    pub fn is_validation(&self) -> bool {
        self.code() == ErrorData::INVALID_PARAMS
    }
}

impl From<ConvertError> for ErrorData {
    fn from(err: ConvertError) -> Self {
        let mut data = json!({ "kind": err.kind() });
        if let ConvertError::BackendStatus { status, .. } = &err {
            data["status"] = json!(status);
        }
        ErrorData::new(err.code(), err.to_string()).with_data(data)
    }
}
