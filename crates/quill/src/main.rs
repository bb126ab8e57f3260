//! quill - MCP document-conversion gateway
//!
//! Subcommands:
//! - `quill stdio` - MCP over stdin/stdout (default)
//! - `quill serve` - MCP over streamable HTTP
//! - `quill ping` - Check the pandoc host is up
//! - `quill convert` - Convert a file once from the command line
//! - `quill config` - Show the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill::{commands, serve, stdio, telemetry};
use quillconf::QuillConfig;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "MCP document-conversion gateway for a pandoc host service")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./quill.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout
    Stdio,

    /// Serve MCP over streamable HTTP
    Serve {
        /// HTTP port to bind (default from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// OTLP gRPC endpoint for OpenTelemetry (e.g., "localhost:4317")
        #[arg(long)]
        otlp_endpoint: Option<String>,
    },

    /// Check that the pandoc host answers GET /health
    Ping {
        /// Timeout in milliseconds
        #[arg(short, long, default_value = "5000")]
        timeout_ms: u64,
    },

    /// Convert a document once and print the result
    Convert {
        /// Source format
        #[arg(short, long, default_value = "markdown")]
        input_format: String,

        /// Target format
        #[arg(short, long, default_value = "markdown")]
        output_format: String,

        /// Save the output here (required for pdf, docx, epub)
        #[arg(long)]
        output_file: Option<PathBuf>,

        /// Input file, or - for stdin
        input: Option<PathBuf>,
    },

    /// Print the effective configuration and its sources
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, sources) = QuillConfig::load_with_sources_from(cli.config.as_deref())
        .context("Failed to load configuration")?;

    let command = cli.command.unwrap_or(Commands::Stdio);

    // Trace export only for the long-running servers
    let otlp_endpoint = match &command {
        Commands::Serve {
            otlp_endpoint: Some(endpoint),
            ..
        } => Some(endpoint.clone()),
        Commands::Serve { .. } | Commands::Stdio => config.telemetry.otlp_endpoint.clone(),
        _ => None,
    };
    let _telemetry = telemetry::init(&config.telemetry.log_level, otlp_endpoint.as_deref())?;

    match command {
        Commands::Stdio => {
            stdio::run(&config.backend).await?;
        }
        Commands::Serve { port, .. } => {
            if let Some(port) = port {
                config.bind.http_port = port;
            }
            serve::run(serve::ServeConfig {
                port: config.bind.http_port,
                backend: config.backend,
            })
            .await?;
        }
        Commands::Ping { timeout_ms } => {
            commands::ping(&config.backend, timeout_ms).await?;
        }
        Commands::Convert {
            input_format,
            output_format,
            output_file,
            input,
        } => {
            commands::convert(
                &config.backend,
                commands::ConvertArgs {
                    input_format,
                    output_format,
                    output_file,
                    input,
                },
            )
            .await?;
        }
        Commands::Config => {
            commands::show_config(&config, &sources);
        }
    }

    Ok(())
}
