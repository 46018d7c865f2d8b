//! transit-console server entry point.
//!
//! Starts the Axum HTTP server backed by the file stores.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use transit_console::api;
use transit_console::app_state::AppState;
use transit_console::config::ConsoleConfig;
use transit_console::service::{StatsService, TicketService};
use transit_console::store::{EventLog, OpsLog, TelemetryLog, TicketIndexStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ConsoleConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting transit-console");

    std::fs::create_dir_all(&config.data_dir)?;

    // Build store layer
    let event_log = Arc::new(EventLog::new(config.ticket_events_path(), config.durability));
    let index_store = Arc::new(TicketIndexStore::open(
        config.ticket_index_path(),
        config.durability,
    ));
    let telemetry_log = Arc::new(TelemetryLog::new(
        config.machine_stats_path(),
        config.gate_stats_path(),
        config.durability,
    ));
    let ops_log = Arc::new(OpsLog::new(config.ops_log_path(), config.durability));

    // Build service layer
    let ticket_service = Arc::new(TicketService::new(event_log, index_store));
    let stats_service = Arc::new(StatsService::new(telemetry_log));

    // Build application state
    let app_state = AppState {
        ticket_service,
        stats_service,
        ops_log,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
