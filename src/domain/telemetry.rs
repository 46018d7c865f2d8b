//! Raw device telemetry records and window keys.
//!
//! Ticket machines and gates push counter snapshots already bucketed into
//! an hour or day window. A [`WindowKey`] is the canonical, fixed-width,
//! lexically-sortable bucket label; the constructors enforce the format so
//! that lexical order on stored keys is chronological order, which the
//! rollup engine relies on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Device discriminator ticket machines must send.
pub const MACHINE_DEVICE: &str = "ticket_machine";

/// Device discriminator gates must send.
pub const GATE_DEVICE: &str = "gate";

/// Aggregation bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Hour-within-day buckets (`YYYY-MM-DD-HH`).
    Hour,
    /// Calendar-day buckets (`YYYY-MM-DD`).
    Day,
}

/// A window key that failed the canonical-format check.
#[derive(Debug, thiserror::Error)]
#[error("malformed window key {key:?}: expected {expected}")]
pub struct WindowKeyError {
    key: String,
    expected: &'static str,
}

/// Canonical aggregation bucket label.
///
/// `YYYY-MM-DD` for day windows, `YYYY-MM-DD-HH` for hour windows, always
/// zero-padded. Stored records deserialize without re-validation; the
/// ingest boundary is where the format is enforced.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowKey(String);

impl WindowKey {
    /// Validates a day window key (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Returns [`WindowKeyError`] unless the key is zero-padded digits in
    /// that exact shape with a plausible month and day.
    pub fn day(raw: &str) -> Result<Self, WindowKeyError> {
        if matches_shape(raw, "dddd-dd-dd") && month_day_ok(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(WindowKeyError {
                key: raw.to_string(),
                expected: "YYYY-MM-DD",
            })
        }
    }

    /// Validates an hour window key (`YYYY-MM-DD-HH`).
    ///
    /// # Errors
    ///
    /// Returns [`WindowKeyError`] unless the key is zero-padded digits in
    /// that exact shape with a plausible month, day, and hour.
    pub fn hour(raw: &str) -> Result<Self, WindowKeyError> {
        if matches_shape(raw, "dddd-dd-dd-dd") && month_day_ok(raw) && component_in(raw, 11, 13, 0, 23)
        {
            Ok(Self(raw.to_string()))
        } else {
            Err(WindowKeyError {
                key: raw.to_string(),
                expected: "YYYY-MM-DD-HH",
            })
        }
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks `raw` against a template where `d` means an ASCII digit and any
/// other byte must match literally.
fn matches_shape(raw: &str, shape: &str) -> bool {
    raw.len() == shape.len()
        && raw.bytes().zip(shape.bytes()).all(|(c, p)| match p {
            b'd' => c.is_ascii_digit(),
            _ => c == p,
        })
}

fn month_day_ok(raw: &str) -> bool {
    component_in(raw, 5, 7, 1, 12) && component_in(raw, 8, 10, 1, 31)
}

fn component_in(raw: &str, start: usize, end: usize, lo: u32, hi: u32) -> bool {
    raw.get(start..end)
        .and_then(|part| part.parse::<u32>().ok())
        .is_some_and(|v| (lo..=hi).contains(&v))
}

/// Counter snapshot reported by a ticket machine.
///
/// Every numeric field defaults to zero when the device omits it, so a
/// sparse record can never fault an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineRecord {
    /// Device discriminator, echoed from the request.
    #[serde(default)]
    pub device: String,
    /// Station the machine is installed at.
    #[serde(default)]
    pub station_code: String,
    /// Human-readable station name.
    #[serde(default)]
    pub station_name: String,
    /// Tickets sold in the window.
    #[serde(default)]
    pub sold_tickets: u64,
    /// Trips sold in the window.
    #[serde(default)]
    pub sold_trips: u64,
    /// Revenue taken in the window.
    #[serde(default)]
    pub revenue: f64,
    /// Device-reported timestamp (epoch ms).
    #[serde(default)]
    pub ts: i64,
    /// Hour window, when the device reports hourly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_hour: Option<WindowKey>,
    /// Day window, when the device reports daily.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_day: Option<WindowKey>,
}

/// Counter snapshot reported by a gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRecord {
    /// Device discriminator, echoed from the request.
    #[serde(default)]
    pub device: String,
    /// Station the gate is installed at.
    #[serde(default)]
    pub station_code: String,
    /// Entries counted in the window.
    #[serde(default)]
    pub entries: u64,
    /// Exits counted in the window.
    #[serde(default)]
    pub exits: u64,
    /// Device-reported timestamp (epoch ms).
    #[serde(default)]
    pub ts: i64,
    /// Hour window, when the device reports hourly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_hour: Option<WindowKey>,
    /// Day window, when the device reports daily.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_day: Option<WindowKey>,
}
