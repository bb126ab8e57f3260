//! Configuration loading for quill.
//!
//! # Config File Locations
//!
//! Sources are applied in order (later wins):
//! 1. Compiled defaults
//! 2. `/etc/quill/config.toml` (system)
//! 3. `~/.config/quill/config.toml` (user)
//! 4. `./quill.toml`, or the file given with `--config`
//! 5. `.env` in the working directory (never overrides the real environment)
//! 6. Environment variables (`PANDOC_HOST_URL`, `QUILL_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [backend]
//! url = "http://pandoc-host:5001/convert"
//! timeout_ms = 30000
//!
//! [bind]
//! http_port = 8090
//!
//! [telemetry]
//! log_level = "info,quill=debug"
//! otlp_endpoint = "http://127.0.0.1:4317"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use settings::{BackendConfig, BindConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete quill configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuillConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl QuillConfig {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, using `config_path` in place of `./quill.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and variables contributed.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = QuillConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::apply_file(&mut config, &path)?;
            sources.files.push(path);
        }

        loader::load_dotenv(&mut sources);
        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        // Built by hand so unset optional values still show up as comments
        let mut output = String::new();

        output.push_str("# quill configuration\n\n");

        output.push_str("[backend]\n");
        match &self.backend.url {
            Some(url) => output.push_str(&format!("url = \"{}\"\n", url)),
            None => output.push_str("# url = \"http://pandoc-host:5001/convert\"  (unset)\n"),
        }
        output.push_str(&format!("timeout_ms = {}\n", self.backend.timeout_ms));

        output.push_str("\n[bind]\n");
        output.push_str(&format!("http_port = {}\n", self.bind.http_port));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));
        match &self.telemetry.otlp_endpoint {
            Some(endpoint) => output.push_str(&format!("otlp_endpoint = \"{}\"\n", endpoint)),
            None => output.push_str("# otlp_endpoint = \"http://127.0.0.1:4317\"  (unset)\n"),
        }

        output
    }
}
