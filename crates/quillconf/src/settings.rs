//! Configuration sections.

use serde::{Deserialize, Serialize};

/// Where and how to reach the pandoc host service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Full URL of the conversion endpoint, e.g. `http://pandoc-host:5001/convert`.
    /// No default: conversions fail with a configuration error until it is set.
    #[serde(default)]
    pub url: Option<String>,

    /// Upper bound on one conversion request, in milliseconds.
    /// Default: 30000
    #[serde(default = "BackendConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl BackendConfig {
    fn default_timeout_ms() -> u64 {
        30_000
    }

    /// Base URL of the host service: the endpoint URL with its last path
    /// segment removed (`http://h:5001/convert` -> `http://h:5001`).
    pub fn base_url(&self) -> Option<String> {
        let url = self.url.as_deref()?.trim_end_matches('/');
        let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
        match url[after_scheme..].rfind('/') {
            Some(slash) => Some(url[..after_scheme + slash].to_string()),
            None => Some(url.to_string()),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

/// Listener for the streamable HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindConfig {
    /// Default: 8090
    #[serde(default = "BindConfig::default_http_port")]
    pub http_port: u16,
}

impl BindConfig {
    fn default_http_port() -> u16 {
        8090
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            http_port: Self::default_http_port(),
        }
    }
}

/// Logging and trace export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive string.
    /// Default: info,quill=debug
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,

    /// OTLP gRPC endpoint; traces are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info,quill=debug".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            otlp_endpoint: None,
        }
    }
}
