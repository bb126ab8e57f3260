//! Logging and optional OpenTelemetry trace export.
//!
//! Logs always go to stderr: stdout carries MCP traffic in stdio mode.

use std::time::Duration;

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Timeout for OTLP exports - prevents blocking on unavailable endpoints
const EXPORT_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_FILTER: &str = "info,quill=debug";

/// Flushes pending spans when dropped.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("Failed to flush traces: {e}");
            }
        }
    }
}

/// Install the global subscriber.
///
/// `filter` is an `EnvFilter` directive string; an invalid one falls back to
/// `info,quill=debug`. With an `otlp_endpoint`, spans are also exported over
/// OTLP/gRPC.
pub fn init(filter: &str, otlp_endpoint: Option<&str>) -> Result<TelemetryGuard> {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (otel_layer, provider) = match otlp_endpoint {
        Some(endpoint) => {
            let provider = tracer_provider(endpoint)?;
            let tracer = provider.tracer("quill");
            (Some(tracing_opentelemetry::layer().with_tracer(tracer)), Some(provider))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(endpoint) = otlp_endpoint {
        tracing::info!(otlp_endpoint = %endpoint, "OpenTelemetry trace export enabled");
    }

    Ok(TelemetryGuard { provider })
}

fn tracer_provider(otlp_endpoint: &str) -> Result<SdkTracerProvider> {
    let resource = Resource::builder_empty()
        .with_service_name("quill")
        .with_attributes(vec![KeyValue::new("service.version", env!("CARGO_PKG_VERSION"))])
        .build();

    let endpoint = if otlp_endpoint.starts_with("http") {
        otlp_endpoint.to_string()
    } else {
        format!("http://{}", otlp_endpoint)
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .with_timeout(EXPORT_TIMEOUT)
        .build()
        .context("Failed to create OTLP span exporter")?;

    let processor = opentelemetry_sdk::trace::BatchSpanProcessor::builder(exporter).build();

    Ok(SdkTracerProvider::builder()
        .with_span_processor(processor)
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource)
        .build())
}
