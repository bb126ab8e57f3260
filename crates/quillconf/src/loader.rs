//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, QuillConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// `.env` file that was read into the process environment, if any
    pub dotenv: Option<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local/cli). Only returns files
/// that exist, except that an explicit `cli_path` is always returned so a
/// typo surfaces as a read error instead of silently loading nothing.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/quill/config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("quill/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("quill.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file and overlay its values onto `config`.
pub fn apply_file(config: &mut QuillConfig, path: &Path) -> Result<(), ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    apply_toml(config, &contents, path)
}

/// Overlay values from a TOML document onto `config`.
///
/// Keys absent from the document leave the current value alone, so files
/// layer naturally. Unknown keys are ignored.
pub fn apply_toml(config: &mut QuillConfig, contents: &str, path: &Path) -> Result<(), ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let wrong_type = |key: &str, expected: &str| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("{} must be {}", key, expected),
    };

    if let Some(backend) = table.get("backend").and_then(|v| v.as_table()) {
        if let Some(v) = backend.get("url") {
            let url = v.as_str().ok_or_else(|| wrong_type("backend.url", "a string"))?;
            config.backend.url = non_empty(url);
        }
        if let Some(v) = backend.get("timeout_ms") {
            config.backend.timeout_ms = v
                .as_integer()
                .and_then(|n| u64::try_from(n).ok())
                .filter(|&ms| ms > 0)
                .ok_or_else(|| wrong_type("backend.timeout_ms", "a positive integer"))?;
        }
    }

    if let Some(bind) = table.get("bind").and_then(|v| v.as_table()) {
        if let Some(v) = bind.get("http_port") {
            config.bind.http_port = v
                .as_integer()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(|| wrong_type("bind.http_port", "a port number"))?;
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level") {
            config.telemetry.log_level = v
                .as_str()
                .ok_or_else(|| wrong_type("telemetry.log_level", "a string"))?
                .to_string();
        }
        if let Some(v) = telemetry.get("otlp_endpoint") {
            let endpoint = v
                .as_str()
                .ok_or_else(|| wrong_type("telemetry.otlp_endpoint", "a string"))?;
            config.telemetry.otlp_endpoint = non_empty(endpoint);
        }
    }

    Ok(())
}

/// Read `.env` (current directory, then parents) into the process
/// environment. Variables already set are never overwritten.
pub fn load_dotenv(sources: &mut ConfigSources) {
    if let Ok(path) = dotenvy::dotenv() {
        sources.dotenv = Some(path);
    }
}

/// Apply environment variable overrides from the process environment.
pub fn apply_env_overrides(config: &mut QuillConfig, sources: &mut ConfigSources) {
    apply_env_overrides_with(config, sources, |key| env::var(key).ok());
}

/// Apply environment variable overrides using `lookup` to read variables.
///
/// Empty values count as unset. Unparseable numbers and a zero timeout are skipped.
pub fn apply_env_overrides_with<F>(config: &mut QuillConfig, sources: &mut ConfigSources, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    // Backend: the conventional name first, the namespaced one wins
    for key in ["PANDOC_HOST_URL", "QUILL_BACKEND_URL"] {
        if let Some(v) = var(key) {
            config.backend.url = Some(v.trim().to_string());
            sources.env_overrides.push(key.to_string());
        }
    }
    if let Some(ms) = var("QUILL_BACKEND_TIMEOUT_MS")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&ms| ms > 0)
    {
        config.backend.timeout_ms = ms;
        sources.env_overrides.push("QUILL_BACKEND_TIMEOUT_MS".to_string());
    }

    if let Some(port) = var("QUILL_HTTP_PORT").and_then(|v| v.trim().parse().ok()) {
        config.bind.http_port = port;
        sources.env_overrides.push("QUILL_HTTP_PORT".to_string());
    }

    if let Some(v) = var("QUILL_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("QUILL_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
    if let Some(v) = var("QUILL_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        sources.env_overrides.push("QUILL_OTLP_ENDPOINT".to_string());
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(toml: &str) -> Result<QuillConfig, ConfigError> {
        let mut config = QuillConfig::default();
        apply_toml(&mut config, toml, Path::new("test.toml"))?;
        Ok(config)
    }

    fn with_env(config: &mut QuillConfig, vars: &[(&str, &str)]) -> ConfigSources {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut sources = ConfigSources::default();
        apply_env_overrides_with(config, &mut sources, |key| vars.get(key).cloned());
        sources
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = parse(
            r#"
[backend]
url = "http://pandoc-host:5001/convert"
"#,
        )
        .unwrap();

        assert_eq!(config.backend.url.as_deref(), Some("http://pandoc-host:5001/convert"));
        // Other values should be defaults
        assert_eq!(config.backend.timeout_ms, 30_000);
        assert_eq!(config.bind.http_port, 8090);
    }

    #[test]
    fn test_parse_full_toml() {
        let config = parse(
            r#"
[backend]
url = "http://10.0.0.5:5001/convert"
timeout_ms = 5000

[bind]
http_port = 9100

[telemetry]
log_level = "debug"
otlp_endpoint = "http://127.0.0.1:4317"
"#,
        )
        .unwrap();

        assert_eq!(config.backend.timeout_ms, 5000);
        assert_eq!(config.bind.http_port, 9100);
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(config.telemetry.otlp_endpoint.as_deref(), Some("http://127.0.0.1:4317"));
    }

    #[test]
    fn test_layering_keeps_earlier_values() {
        let mut config = QuillConfig::default();
        apply_toml(&mut config, "[backend]\nurl = \"http://a/convert\"\n", Path::new("a.toml")).unwrap();
        apply_toml(&mut config, "[bind]\nhttp_port = 7000\n", Path::new("b.toml")).unwrap();

        assert_eq!(config.backend.url.as_deref(), Some("http://a/convert"));
        assert_eq!(config.bind.http_port, 7000);
    }

    #[test]
    fn test_empty_url_is_unset() {
        let config = parse("[backend]\nurl = \"  \"\n").unwrap();
        assert!(config.backend.url.is_none());
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = parse("[bind]\nhttp_port = 700000\n").unwrap_err();
        assert!(err.to_string().contains("bind.http_port"));

        let err = parse("[backend]\ntimeout_ms = \"soon\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse("[backend]\ntimeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("backend.timeout_ms must be a positive integer"));

        let mut config = QuillConfig::default();
        let sources = with_env(&mut config, &[("QUILL_BACKEND_TIMEOUT_MS", "0")]);
        assert_eq!(config.backend.timeout_ms, 30_000);
        assert!(sources.env_overrides.is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        let err = parse("[backend\nurl = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = QuillConfig::default();
        let sources = with_env(
            &mut config,
            &[
                ("PANDOC_HOST_URL", "http://pandoc:5001/convert"),
                ("QUILL_BACKEND_TIMEOUT_MS", "1500"),
                ("QUILL_HTTP_PORT", "not-a-port"),
                ("QUILL_OTLP_ENDPOINT", "http://otel:4317"),
            ],
        );

        assert_eq!(config.backend.url.as_deref(), Some("http://pandoc:5001/convert"));
        assert_eq!(config.backend.timeout_ms, 1500);
        assert_eq!(config.bind.http_port, 8090);
        assert_eq!(config.telemetry.otlp_endpoint.as_deref(), Some("http://otel:4317"));
        assert_eq!(
            sources.env_overrides,
            vec!["PANDOC_HOST_URL", "QUILL_BACKEND_TIMEOUT_MS", "QUILL_OTLP_ENDPOINT"]
        );
    }

    #[test]
    fn test_namespaced_url_wins() {
        let mut config = QuillConfig::default();
        with_env(
            &mut config,
            &[
                ("PANDOC_HOST_URL", "http://legacy/convert"),
                ("QUILL_BACKEND_URL", "http://preferred/convert"),
            ],
        );
        assert_eq!(config.backend.url.as_deref(), Some("http://preferred/convert"));
    }

    #[test]
    fn test_rust_log_beats_quill_log_level() {
        let mut config = QuillConfig::default();
        with_env(&mut config, &[("QUILL_LOG_LEVEL", "warn"), ("RUST_LOG", "trace")]);
        assert_eq!(config.telemetry.log_level, "trace");
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = QuillConfig::default();
        config.backend.url = Some("http://from-file/convert".to_string());
        let sources = with_env(&mut config, &[("PANDOC_HOST_URL", "")]);

        assert_eq!(config.backend.url.as_deref(), Some("http://from-file/convert"));
        assert!(sources.env_overrides.is_empty());
    }

    #[test]
    fn test_explicit_config_path_always_listed() {
        let files = discover_config_files_with_override(Some(Path::new("/nonexistent/quill.toml")));
        assert_eq!(files.last(), Some(&PathBuf::from("/nonexistent/quill.toml")));
    }
}
