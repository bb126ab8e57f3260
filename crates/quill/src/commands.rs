//! CLI command implementations

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use quillconf::{BackendConfig, ConfigSources, QuillConfig};
use serde_json::{json, Value};

use crate::backend::BackendClient;
use crate::handler::ConvertHandler;

/// Check that the pandoc host answers its health endpoint.
pub async fn ping(backend: &BackendConfig, timeout_ms: u64) -> Result<()> {
    let config = BackendConfig {
        timeout_ms,
        ..backend.clone()
    };
    let client = BackendClient::new(&config)?;

    let start = Instant::now();
    let health = client.health().await?;
    let elapsed = start.elapsed();

    println!(
        "Host at {} is {} ({:?})",
        client.endpoint(),
        health.get("status").and_then(Value::as_str).unwrap_or("up"),
        elapsed
    );
    Ok(())
}

/// Arguments for a one-shot conversion from the command line.
pub struct ConvertArgs {
    pub input_format: String,
    pub output_format: String,
    pub output_file: Option<PathBuf>,
    /// `None` or `-` reads stdin.
    pub input: Option<PathBuf>,
}

/// Run the same pipeline as the MCP tool once and print its result.
pub async fn convert(backend: &BackendConfig, args: ConvertArgs) -> Result<()> {
    let contents = read_input(args.input.as_deref())?;

    let mut arguments = json!({
        "contents": contents,
        "input_format": args.input_format,
        "output_format": args.output_format,
    });
    if let Some(path) = &args.output_file {
        let absolute = std::path::absolute(path)
            .with_context(|| format!("Cannot resolve output path {}", path.display()))?;
        arguments["output_file"] = json!(absolute);
    }

    let output = ConvertHandler::new(backend).convert(&arguments).await?;
    println!("{}", output);
    Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Print the effective configuration and where it came from.
pub fn show_config(config: &QuillConfig, sources: &ConfigSources) {
    println!("{}", config.to_toml());

    println!("# Sources");
    if sources.files.is_empty() {
        println!("#   (no config files, using defaults)");
    }
    for file in &sources.files {
        println!("#   file: {}", file.display());
    }
    if let Some(dotenv) = &sources.dotenv {
        println!("#   dotenv: {}", dotenv.display());
    }
    for var in &sources.env_overrides {
        println!("#   env: {}", var);
    }
}
