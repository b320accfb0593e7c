// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::application::sync_core::SyncCore;
use crate::infrastructure::config::{load_region_registry, load_telemetry_config};
use crate::infrastructure::http_client::HttpTelemetryClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    dismiss_error, get_snapshot, health_check, select_region, trigger_refresh,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_telemetry_config()?;
    let registry = load_region_registry()?;

    // Create the telemetry client (infrastructure layer)
    let client = Arc::new(HttpTelemetryClient::new(
        config.telemetry.base_url.clone(),
        Duration::from_secs(config.telemetry.request_timeout_secs),
    )?);

    // Start the synchronization core (application layer): staggered cold
    // start, recurring refresh cycles, countdown ticker.
    let core = SyncCore::init(
        client,
        registry,
        config.sync.to_settings(config.telemetry.window_hours),
    )?;

    // Create application state
    let state = Arc::new(AppState { core });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/snapshot", get(get_snapshot))
        .route("/refresh", post(trigger_refresh))
        .route("/select/:region", post(select_region))
        .route("/dismiss_error", post(dismiss_error))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!(%addr, "starting grid-telemetry sync service");

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Tear down timers and recurring tasks before exit.
    state.core.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install ctrl-c handler");
    }
}
