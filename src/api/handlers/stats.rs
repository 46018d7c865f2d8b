//! Telemetry handlers: ingest plus windowed rollup queries.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AckResponse, GateTelemetryRequest, MachineTelemetryRequest};
use crate::app_state::AppState;
use crate::domain::Granularity;
use crate::error::{ConsoleError, ErrorResponse};

/// `POST /stats/ticket` — Ingest a ticket-machine counter snapshot.
///
/// # Errors
///
/// Returns [`ConsoleError::Validation`] on a wrong device tag or a
/// missing/malformed window key.
#[utoipa::path(
    post,
    path = "/api/stats/ticket",
    tag = "Stats",
    summary = "Ingest ticket-machine telemetry",
    description = "Appends one counter snapshot from a ticket machine. The device tag must be `ticket_machine` and at least one of `window_hour`/`window_day` must be a well-formed window key.",
    request_body = MachineTelemetryRequest,
    responses(
        (status = 200, description = "Snapshot recorded", body = AckResponse),
        (status = 400, description = "Wrong device or bad window key", body = ErrorResponse),
    )
)]
pub async fn ingest_machine(
    State(state): State<AppState>,
    Json(req): Json<MachineTelemetryRequest>,
) -> Result<impl IntoResponse, ConsoleError> {
    state.stats_service.record_machine(req).await?;
    Ok(Json(AckResponse::ok()))
}

/// `POST /stats/gate` — Ingest a gate counter snapshot.
///
/// # Errors
///
/// Returns [`ConsoleError::Validation`] on a wrong device tag or a
/// missing/malformed window key.
#[utoipa::path(
    post,
    path = "/api/stats/gate",
    tag = "Stats",
    summary = "Ingest gate telemetry",
    description = "Appends one entries/exits snapshot from a gate. The device tag must be `gate` and at least one of `window_hour`/`window_day` must be a well-formed window key.",
    request_body = GateTelemetryRequest,
    responses(
        (status = 200, description = "Snapshot recorded", body = AckResponse),
        (status = 400, description = "Wrong device or bad window key", body = ErrorResponse),
    )
)]
pub async fn ingest_gate(
    State(state): State<AppState>,
    Json(req): Json<GateTelemetryRequest>,
) -> Result<impl IntoResponse, ConsoleError> {
    state.stats_service.record_gate(req).await?;
    Ok(Json(AckResponse::ok()))
}

/// `GET /stats/ticket/byDay` — Machine sums per day, ascending.
#[utoipa::path(
    get,
    path = "/api/stats/ticket/byDay",
    tag = "Stats",
    summary = "Machine rollup by day",
    responses(
        (status = 200, description = "Per-day sums, windows ascending", body = serde_json::Value),
    )
)]
pub async fn machine_by_day(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats_service.machine_rollup(Granularity::Day)))
}

/// `GET /stats/ticket/byHour` — Machine sums per hour, ascending.
#[utoipa::path(
    get,
    path = "/api/stats/ticket/byHour",
    tag = "Stats",
    summary = "Machine rollup by hour",
    responses(
        (status = 200, description = "Per-hour sums, windows ascending", body = serde_json::Value),
    )
)]
pub async fn machine_by_hour(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats_service.machine_rollup(Granularity::Hour)))
}

/// `GET /stats/ticket/total` — Running machine total across all windows.
#[utoipa::path(
    get,
    path = "/api/stats/ticket/total",
    tag = "Stats",
    summary = "Machine running total",
    responses(
        (status = 200, description = "Sums across every snapshot", body = serde_json::Value),
    )
)]
pub async fn machine_total(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats_service.machine_total()))
}

/// `GET /stats/gate/byDay` — Gate sums per day, ascending.
#[utoipa::path(
    get,
    path = "/api/stats/gate/byDay",
    tag = "Stats",
    summary = "Gate rollup by day",
    responses(
        (status = 200, description = "Per-day sums, windows ascending", body = serde_json::Value),
    )
)]
pub async fn gate_by_day(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats_service.gate_rollup(Granularity::Day)))
}

/// `GET /stats/gate/byHour` — Gate sums per hour, ascending.
#[utoipa::path(
    get,
    path = "/api/stats/gate/byHour",
    tag = "Stats",
    summary = "Gate rollup by hour",
    responses(
        (status = 200, description = "Per-hour sums, windows ascending", body = serde_json::Value),
    )
)]
pub async fn gate_by_hour(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats_service.gate_rollup(Granularity::Hour)))
}

/// `GET /stats/gate/total` — Running gate total across all windows.
#[utoipa::path(
    get,
    path = "/api/stats/gate/total",
    tag = "Stats",
    summary = "Gate running total",
    responses(
        (status = 200, description = "Sums across every snapshot", body = serde_json::Value),
    )
)]
pub async fn gate_total(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.stats_service.gate_total()))
}

/// Telemetry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats/ticket", post(ingest_machine))
        .route("/stats/ticket/byDay", get(machine_by_day))
        .route("/stats/ticket/byHour", get(machine_by_hour))
        .route("/stats/ticket/total", get(machine_total))
        .route("/stats/gate", post(ingest_gate))
        .route("/stats/gate/byDay", get(gate_by_day))
        .route("/stats/gate/byHour", get(gate_by_hour))
        .route("/stats/gate/total", get(gate_total))
}
