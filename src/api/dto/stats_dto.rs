//! Telemetry ingest DTOs for ticket machines and gates.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /api/stats/ticket`.
///
/// Counters are deltas for the reported window; omitted counters count
/// as zero. At least one of `window_hour` / `window_day` is required.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MachineTelemetryRequest {
    /// Device discriminator; must be `ticket_machine`.
    #[serde(default)]
    pub device: String,
    /// Code of the reporting station.
    #[serde(default)]
    pub station_code: Option<String>,
    /// Name of the reporting station.
    #[serde(default)]
    pub station_name: Option<String>,
    /// Tickets sold during the window.
    #[serde(default)]
    pub sold_tickets: Option<u64>,
    /// Trips sold during the window.
    #[serde(default)]
    pub sold_trips: Option<u64>,
    /// Revenue collected during the window.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Client-side report time (epoch ms); server-assigned when absent.
    #[serde(default)]
    pub ts: Option<i64>,
    /// Hourly window key, `YYYY-MM-DD-HH`.
    #[serde(default)]
    pub window_hour: Option<String>,
    /// Daily window key, `YYYY-MM-DD`.
    #[serde(default)]
    pub window_day: Option<String>,
}

/// Request body for `POST /api/stats/gate`.
///
/// Same window-key rules as the machine variant.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GateTelemetryRequest {
    /// Device discriminator; must be `gate`.
    #[serde(default)]
    pub device: String,
    /// Code of the reporting station.
    #[serde(default)]
    pub station_code: Option<String>,
    /// Entries counted during the window.
    #[serde(default)]
    pub entries: Option<u64>,
    /// Exits counted during the window.
    #[serde(default)]
    pub exits: Option<u64>,
    /// Client-side report time (epoch ms); server-assigned when absent.
    #[serde(default)]
    pub ts: Option<i64>,
    /// Hourly window key, `YYYY-MM-DD-HH`.
    #[serde(default)]
    pub window_hour: Option<String>,
    /// Daily window key, `YYYY-MM-DD`.
    #[serde(default)]
    pub window_day: Option<String>,
}
