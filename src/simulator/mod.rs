//! Simulated Transfer Backend
//!
//! Stand-in for the real bridge API: accepts transfer requests and, after a
//! random delay, either assigns a transaction id or declines. Development
//! and testing only; compiled with the `mock-api` feature.

pub mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::SimulatorConfig;

/// Shared handler state
pub struct SimulatorState {
    pub config: SimulatorConfig,
}

/// Path the orchestrator's HTTP backend posts to
pub const TRANSFER_PATH: &str = "/api/bridge/transfer";

pub fn router(config: SimulatorConfig) -> Router {
    let state = Arc::new(SimulatorState { config });

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route(TRANSFER_PATH, post(handlers::submit_transfer))
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn serve(config: SimulatorConfig) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    info!(
        addr = %addr,
        min_delay_ms = config.min_delay_ms,
        max_delay_ms = config.max_delay_ms,
        failure_rate = config.failure_rate,
        "Simulated bridge backend listening"
    );

    serve_on(listener, config).await
}

/// Serve on an already bound listener (port 0 in tests)
pub async fn serve_on(listener: TcpListener, config: SimulatorConfig) -> std::io::Result<()> {
    axum::serve(listener, router(config)).await
}
