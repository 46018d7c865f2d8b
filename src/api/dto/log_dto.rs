//! DTOs for the console operations log endpoints.

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Request body for `POST /api/log`.
///
/// Anything beyond the action tag is captured verbatim into the entry's
/// detail payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OpsLogRequest {
    /// Action tag; defaults to `event` when absent.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Free-form action payload (all remaining fields).
    #[serde(flatten)]
    pub detail: serde_json::Value,
}

/// Default number of trailing ops-log entries returned by `GET /api/logs`.
pub const DEFAULT_TAIL: usize = 200;

/// Query parameters for `GET /api/logs`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct LogListParams {
    /// Maximum number of trailing entries to return; omitted or zero
    /// means the default of 200.
    #[serde(default)]
    pub max: Option<usize>,
}

impl LogListParams {
    /// Effective tail size: `max` when positive, [`DEFAULT_TAIL`]
    /// otherwise. Zero is treated as unset, not as an empty window.
    #[must_use]
    pub fn tail(&self) -> usize {
        match self.max {
            Some(max) if max > 0 => max,
            _ => DEFAULT_TAIL,
        }
    }
}
