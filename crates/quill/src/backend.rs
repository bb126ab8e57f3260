//! HTTP client for the pandoc host service.
//!
//! One POST per conversion, no retries. Transport faults are sorted into
//! timeout, unreachable, and bad-status so callers can tell "not running"
//! from "too slow" from "rejected".

use std::time::{Duration, Instant};

use quillconf::BackendConfig;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::ConvertError;
use crate::request::ConversionRequest;

/// Successful reply from the host, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    /// Base64 file content, with the format the host says it produced.
    Binary {
        data_base64: String,
        declared_format: Option<String>,
    },
    /// Converted text to return inline.
    Text { content: String },
    /// Success status with neither content field.
    Empty,
}

impl BackendReply {
    /// Classify a reply body. Binary content wins over text when both are
    /// present; empty strings count as absent.
    pub fn from_json(body: &Value) -> Self {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        if let Some(data_base64) = field("file_content_base64") {
            return BackendReply::Binary {
                data_base64,
                declared_format: field("output_format"),
            };
        }

        match field("converted_content") {
            Some(content) => BackendReply::Text { content },
            None => BackendReply::Empty,
        }
    }
}

/// Client bound to one configured endpoint.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    endpoint: String,
    base_url: String,
}

impl BackendClient {
    /// Fails with a configuration error when no endpoint URL is configured.
    pub fn new(config: &BackendConfig) -> Result<Self, ConvertError> {
        let endpoint = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(ConvertError::missing_backend_url)?
            .to_string();

        let base_url = config.base_url().unwrap_or_else(|| endpoint.clone());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ConvertError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            base_url,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the request to the host and classify the reply.
    #[instrument(
        name = "backend.convert",
        skip_all,
        fields(
            endpoint = %self.endpoint,
            input_format = %request.input_format,
            output_format = %request.output_format,
            status = tracing::field::Empty,
        )
    )]
    pub async fn convert(&self, request: &ConversionRequest) -> Result<BackendReply, ConvertError> {
        let start = Instant::now();

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request.payload())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        let body = response.text().await.map_err(|e| self.body_error(e))?;

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| format!("Host service responded with status {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "Host rejected conversion");
            return Err(ConvertError::BackendStatus {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ConvertError::InvalidBackendReply(format!("reply is not JSON: {}", e)))?;

        let reply = BackendReply::from_json(&value);
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            kind = reply_kind(&reply),
            "Host replied"
        );
        Ok(reply)
    }

    /// GET `<base>/health` on the host.
    #[instrument(name = "backend.health", skip_all, fields(base_url = %self.base_url))]
    pub async fn health(&self) -> Result<Value, ConvertError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.body_error(e))?;

        if !status.is_success() {
            return Err(ConvertError::BackendStatus {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or_else(|| "health check failed".to_string()),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ConvertError::InvalidBackendReply(format!("health reply is not JSON: {}", e)))
    }

    /// The host answered with a status but the body could not be read.
    fn body_error(&self, err: reqwest::Error) -> ConvertError {
        if err.is_timeout() {
            return self.transport_error(err);
        }
        let reason = root_cause(&err);
        warn!(endpoint = %self.endpoint, %reason, "Host reply body unreadable");
        ConvertError::InvalidBackendReply(format!("failed to read reply body: {}", reason))
    }

    fn transport_error(&self, err: reqwest::Error) -> ConvertError {
        if err.is_timeout() {
            warn!(endpoint = %self.endpoint, "Host timed out");
            ConvertError::BackendTimeout {
                endpoint: self.endpoint.clone(),
            }
        } else {
            let reason = root_cause(&err);
            warn!(endpoint = %self.endpoint, %reason, connect = err.is_connect(), "Host unreachable");
            ConvertError::BackendUnreachable {
                endpoint: self.endpoint.clone(),
                reason,
            }
        }
    }
}

/// The `error` field of a JSON body, else the trimmed raw body.
fn error_message(body: &str) -> Option<String> {
    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from));

    from_json.or_else(|| {
        let trimmed = body.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Innermost error message; reqwest's own Display only says "error sending request".
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}

fn reply_kind(reply: &BackendReply) -> &'static str {
    match reply {
        BackendReply::Binary { .. } => "binary",
        BackendReply::Text { .. } => "text",
        BackendReply::Empty => "empty",
    }
}
