//! Ticket handlers: sale/status recording, history, list/search.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AckResponse, SaleRequest, StatusRequest, TicketHistoryResponse, TicketListParams, TicketRow,
};
use crate::api::handlers::client_source;
use crate::app_state::AppState;
use crate::error::{ConsoleError, ErrorResponse};

/// `POST /tickets/sale` — Record a ticket sale.
///
/// # Errors
///
/// Returns [`ConsoleError::Validation`] when the ticket id is empty.
#[utoipa::path(
    post,
    path = "/api/tickets/sale",
    tag = "Tickets",
    summary = "Record a ticket sale",
    description = "Appends a sale event to the ticket event log and upserts the derived index entry.",
    request_body = SaleRequest,
    responses(
        (status = 200, description = "Event recorded", body = AckResponse),
        (status = 400, description = "Empty ticket id", body = ErrorResponse),
    )
)]
pub async fn record_sale(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<SaleRequest>,
) -> Result<impl IntoResponse, ConsoleError> {
    let source = client_source(&headers, peer);
    state.ticket_service.record_sale(req, source).await?;
    Ok(Json(AckResponse::ok()))
}

/// `POST /tickets/status` — Record a gate crossing or trips update.
///
/// # Errors
///
/// Returns [`ConsoleError::Validation`] when the ticket id is empty or
/// the action is not `enter`/`exit`/`update`.
#[utoipa::path(
    post,
    path = "/api/tickets/status",
    tag = "Tickets",
    summary = "Record a ticket status event",
    description = "Appends an enter/exit/update event and upserts the derived index entry.",
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Event recorded", body = AckResponse),
        (status = 400, description = "Empty ticket id or unrecognized action", body = ErrorResponse),
    )
)]
pub async fn record_status(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<StatusRequest>,
) -> Result<impl IntoResponse, ConsoleError> {
    let source = client_source(&headers, peer);
    state.ticket_service.record_status(req, source).await?;
    Ok(Json(AckResponse::ok()))
}

/// `GET /tickets/:id` — Latest index entry plus full event history.
///
/// # Errors
///
/// Returns [`ConsoleError::Validation`] when the id is blank.
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    summary = "Get ticket history",
    description = "Returns the latest index entry (null when the ticket has never been seen) and every logged event of the ticket in arrival order.",
    params(
        ("id" = String, Path, description = "Ticket identifier"),
    ),
    responses(
        (status = 200, description = "Ticket history", body = serde_json::Value),
        (status = 400, description = "Blank ticket id", body = ErrorResponse),
    )
)]
pub async fn ticket_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ConsoleError> {
    let history = state.ticket_service.history(&id).await?;
    Ok(Json(TicketHistoryResponse {
        ticket_id: history.ticket_id.as_str().to_string(),
        index: history.index,
        events: history.events,
    }))
}

/// `GET /tickets` — List index entries, most recently touched first.
#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Tickets",
    summary = "List tickets",
    description = "Returns every index entry ordered by ingest recency, optionally filtered by a case-insensitive substring over ticket id, station code, origin, and terminal.",
    params(TicketListParams),
    responses(
        (status = 200, description = "Index rows in recency order", body = serde_json::Value),
    )
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    Query(params): Query<TicketListParams>,
) -> impl IntoResponse {
    let rows: Vec<TicketRow> = state
        .ticket_service
        .list(params.q.as_deref())
        .await
        .into_iter()
        .map(|(ticket_id, entry)| TicketRow { ticket_id, entry })
        .collect();
    (StatusCode::OK, Json(rows))
}

/// Ticket routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(list_tickets))
        .route("/tickets/sale", post(record_sale))
        .route("/tickets/status", post(record_status))
        .route("/tickets/{id}", get(ticket_history))
}
