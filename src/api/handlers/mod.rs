//! REST endpoint handlers organized by resource.

pub mod logs;
pub mod stats;
pub mod system;
pub mod tickets;

use std::net::SocketAddr;

use axum::Router;
use axum::http::HeaderMap;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(tickets::routes())
        .merge(stats::routes())
        .merge(logs::routes())
}

/// Best-effort client address for event attribution: the first
/// `x-forwarded-for` hop when present, otherwise the peer IP.
pub(crate) fn client_source(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map_or_else(|| peer.ip().to_string(), ToString::to_string)
}
