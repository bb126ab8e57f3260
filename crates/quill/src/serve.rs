//! Streamable HTTP server.
//!
//! - `POST /mcp` - MCP JSON-RPC
//! - `GET /health` - liveness and backend configuration

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handler::ConvertHandler;
use quillconf::BackendConfig;

pub struct ServeConfig {
    pub port: u16,
    pub backend: BackendConfig,
}

/// Server state for health endpoint
#[derive(Clone)]
pub struct HealthState {
    pub backend_url: Option<String>,
    pub start_time: Instant,
}

/// Health check endpoint
pub async fn handle_health(State(state): State<HealthState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
        "backend": {
            "configured": state.backend_url.is_some(),
            "url": state.backend_url,
        }
    }))
}

/// Build the full application router.
pub fn app(backend: &BackendConfig) -> Router {
    let mcp_state = Arc::new(baton::McpState::new(ConvertHandler::new(backend)));

    let health_state = HealthState {
        backend_url: backend.url.clone(),
        start_time: Instant::now(),
    };

    let health_router = Router::new()
        .route("/health", get(handle_health))
        .with_state(health_state);

    Router::new()
        .nest("/mcp", baton::router(mcp_state))
        .merge(health_router)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until SIGINT/SIGTERM.
pub async fn run(config: ServeConfig) -> Result<()> {
    let app = app(&config.backend);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "quill ready");
    info!("   MCP (Streamable): POST http://{}/mcp", addr);
    info!("   Health: GET http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let sigterm = async {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, shutting down...");
        }
        _ = sigterm => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
