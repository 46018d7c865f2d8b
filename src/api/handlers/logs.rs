//! Console operations log handlers.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{AckResponse, LogListParams, OpsLogRequest};
use crate::api::handlers::client_source;
use crate::app_state::AppState;
use crate::error::{ConsoleError, ErrorResponse};
use crate::store::OpsEntry;

/// `POST /log` — Append one console operation to the audit trail.
///
/// # Errors
///
/// Returns [`ConsoleError::Persistence`] when a fail-fast write fails.
#[utoipa::path(
    post,
    path = "/api/log",
    tag = "Logs",
    summary = "Append an ops-log entry",
    description = "Records a console action. The optional `type` field tags the action (default `event`); every other field is captured verbatim as the entry detail.",
    request_body = OpsLogRequest,
    responses(
        (status = 200, description = "Entry recorded", body = AckResponse),
        (status = 500, description = "Durable write failed", body = ErrorResponse),
    )
)]
pub async fn append_log(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<OpsLogRequest>,
) -> Result<impl IntoResponse, ConsoleError> {
    let entry = OpsEntry {
        ts: Utc::now().to_rfc3339(),
        source: client_source(&headers, peer),
        kind: req.kind.unwrap_or_else(|| "event".to_string()),
        detail: req.detail,
    };
    state.ops_log.append(&entry).await?;
    Ok(Json(AckResponse::ok()))
}

/// `GET /logs` — Read the most recent audit-trail entries.
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    summary = "Read recent ops-log entries",
    params(LogListParams),
    responses(
        (status = 200, description = "Trailing entries in arrival order", body = serde_json::Value),
    )
)]
pub async fn list_logs(
    State(state): State<AppState>,
    Query(params): Query<LogListParams>,
) -> impl IntoResponse {
    (StatusCode::OK, Json(state.ops_log.read_last(params.tail())))
}

/// Ops-log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/log", post(append_log))
        .route("/logs", get(list_logs))
}
