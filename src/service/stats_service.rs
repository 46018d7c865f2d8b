//! Stats service: telemetry ingest validation and rollup queries.
//!
//! Ingest rejects wrong device discriminators and missing or malformed
//! window keys, normalizes absent counters to zero, and appends. Every
//! rollup query is a fresh full scan reduced by [`crate::domain::rollup`].

use std::sync::Arc;

use crate::api::dto::{GateTelemetryRequest, MachineTelemetryRequest};
use crate::domain::rollup::{self, GateTotals, MachineTotals, WindowTotals};
use crate::domain::telemetry::{GATE_DEVICE, MACHINE_DEVICE};
use crate::domain::{GateRecord, Granularity, MachineRecord, WindowKey, now_ms};
use crate::error::ConsoleError;
use crate::store::TelemetryLog;

/// Orchestration layer for device telemetry.
#[derive(Debug)]
pub struct StatsService {
    telemetry: Arc<TelemetryLog>,
}

impl StatsService {
    /// Creates a new `StatsService` over the given telemetry streams.
    #[must_use]
    pub fn new(telemetry: Arc<TelemetryLog>) -> Self {
        Self { telemetry }
    }

    /// Records one ticket-machine counter snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] unless the device tag is
    /// `ticket_machine` and at least one well-formed window key is
    /// present; [`ConsoleError::Persistence`] when a fail-fast write
    /// fails.
    pub async fn record_machine(&self, req: MachineTelemetryRequest) -> Result<(), ConsoleError> {
        check_device(&req.device, MACHINE_DEVICE)?;
        let (window_hour, window_day) =
            parse_windows(req.window_hour.as_deref(), req.window_day.as_deref())?;
        let record = MachineRecord {
            device: req.device,
            station_code: req.station_code.unwrap_or_default(),
            station_name: req.station_name.unwrap_or_default(),
            sold_tickets: req.sold_tickets.unwrap_or(0),
            sold_trips: req.sold_trips.unwrap_or(0),
            revenue: req.revenue.unwrap_or(0.0),
            ts: req.ts.unwrap_or_else(now_ms),
            window_hour,
            window_day,
        };
        self.telemetry.append_machine(&record).await?;
        Ok(())
    }

    /// Records one gate counter snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Validation`] unless the device tag is
    /// `gate` and at least one well-formed window key is present;
    /// [`ConsoleError::Persistence`] when a fail-fast write fails.
    pub async fn record_gate(&self, req: GateTelemetryRequest) -> Result<(), ConsoleError> {
        check_device(&req.device, GATE_DEVICE)?;
        let (window_hour, window_day) =
            parse_windows(req.window_hour.as_deref(), req.window_day.as_deref())?;
        let record = GateRecord {
            device: req.device,
            station_code: req.station_code.unwrap_or_default(),
            entries: req.entries.unwrap_or(0),
            exits: req.exits.unwrap_or(0),
            ts: req.ts.unwrap_or_else(now_ms),
            window_hour,
            window_day,
        };
        self.telemetry.append_gate(&record).await?;
        Ok(())
    }

    /// Ticket-machine sums grouped by window, ascending.
    #[must_use]
    pub fn machine_rollup(&self, granularity: Granularity) -> Vec<WindowTotals<MachineTotals>> {
        rollup::aggregate_by(&self.telemetry.read_machine(), granularity)
    }

    /// Running ticket-machine total across all windows.
    #[must_use]
    pub fn machine_total(&self) -> MachineTotals {
        rollup::aggregate_total(&self.telemetry.read_machine())
    }

    /// Gate sums grouped by window, ascending.
    #[must_use]
    pub fn gate_rollup(&self, granularity: Granularity) -> Vec<WindowTotals<GateTotals>> {
        rollup::aggregate_by(&self.telemetry.read_gate(), granularity)
    }

    /// Running gate total across all windows.
    #[must_use]
    pub fn gate_total(&self) -> GateTotals {
        rollup::aggregate_total(&self.telemetry.read_gate())
    }
}

fn check_device(device: &str, expected: &str) -> Result<(), ConsoleError> {
    if device == expected {
        Ok(())
    } else {
        Err(ConsoleError::Validation(format!("device must be {expected}")))
    }
}

/// Validates the optional window keys, treating blank strings as absent.
/// At least one key must survive.
fn parse_windows(
    hour: Option<&str>,
    day: Option<&str>,
) -> Result<(Option<WindowKey>, Option<WindowKey>), ConsoleError> {
    let hour = hour
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(WindowKey::hour)
        .transpose()
        .map_err(|err| ConsoleError::Validation(err.to_string()))?;
    let day = day
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(WindowKey::day)
        .transpose()
        .map_err(|err| ConsoleError::Validation(err.to_string()))?;
    if hour.is_none() && day.is_none() {
        return Err(ConsoleError::Validation(
            "window_hour or window_day required".to_string(),
        ));
    }
    Ok((hour, day))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn tempdir() -> tempfile::TempDir {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir creation failed");
        };
        dir
    }

    fn make_service(dir: &tempfile::TempDir) -> StatsService {
        let telemetry = Arc::new(TelemetryLog::new(
            dir.path().join("stats_ticket.jsonl"),
            dir.path().join("stats_gate.jsonl"),
            crate::store::DurabilityMode::FailFast,
        ));
        StatsService::new(telemetry)
    }

    fn machine_request(day: &str, revenue: f64) -> MachineTelemetryRequest {
        MachineTelemetryRequest {
            device: "ticket_machine".to_string(),
            station_code: Some("01-01".to_string()),
            station_name: None,
            sold_tickets: Some(1),
            sold_trips: None,
            revenue: Some(revenue),
            ts: None,
            window_hour: None,
            window_day: Some(day.to_string()),
        }
    }

    fn gate_request(day: &str, entries: u64, exits: u64) -> GateTelemetryRequest {
        GateTelemetryRequest {
            device: "gate".to_string(),
            station_code: Some("02-01".to_string()),
            entries: Some(entries),
            exits: Some(exits),
            ts: None,
            window_hour: None,
            window_day: Some(day.to_string()),
        }
    }

    #[tokio::test]
    async fn machine_rollup_by_day_sums_ascending() {
        let dir = tempdir();
        let service = make_service(&dir);

        assert!(service.record_machine(machine_request("2024-01-01", 10.0)).await.is_ok());
        assert!(service.record_machine(machine_request("2024-01-01", 5.0)).await.is_ok());
        assert!(service.record_machine(machine_request("2024-01-02", 7.0)).await.is_ok());

        let rollup = service.machine_rollup(Granularity::Day);
        let summary: Vec<(&str, f64)> = rollup
            .iter()
            .map(|w| (w.window.as_str(), w.totals.revenue))
            .collect();
        assert_eq!(summary, vec![("2024-01-01", 15.0), ("2024-01-02", 7.0)]);

        let total = service.machine_total();
        assert_eq!(total.revenue, 22.0);
    }

    #[tokio::test]
    async fn missing_counters_default_to_zero() {
        let dir = tempdir();
        let service = make_service(&dir);

        // sold_trips omitted entirely.
        assert!(service.record_machine(machine_request("2024-01-01", 1.0)).await.is_ok());
        let total = service.machine_total();
        assert_eq!(total.sold_trips, 0);
        assert_eq!(total.sold_tickets, 1);
    }

    #[tokio::test]
    async fn wrong_device_tag_is_rejected() {
        let dir = tempdir();
        let service = make_service(&dir);

        let mut req = machine_request("2024-01-01", 1.0);
        req.device = "gate".to_string();
        let result = service.record_machine(req).await;
        assert!(matches!(result, Err(ConsoleError::Validation(_))));
        assert!(service.machine_rollup(Granularity::Day).is_empty());
    }

    #[tokio::test]
    async fn missing_window_keys_are_rejected() {
        let dir = tempdir();
        let service = make_service(&dir);

        let mut req = machine_request("2024-01-01", 1.0);
        req.window_day = None;
        let result = service.record_machine(req).await;
        assert!(matches!(result, Err(ConsoleError::Validation(_))));

        // Blank keys count as absent.
        let mut req = machine_request("2024-01-01", 1.0);
        req.window_day = Some("  ".to_string());
        let result = service.record_machine(req).await;
        assert!(matches!(result, Err(ConsoleError::Validation(_))));
    }

    #[tokio::test]
    async fn malformed_window_key_is_rejected() {
        let dir = tempdir();
        let service = make_service(&dir);

        let result = service.record_machine(machine_request("Jan 1st", 1.0)).await;
        assert!(matches!(result, Err(ConsoleError::Validation(_))));
    }

    #[tokio::test]
    async fn gate_rollup_is_independent_of_machine_stream() {
        let dir = tempdir();
        let service = make_service(&dir);

        assert!(service.record_gate(gate_request("2024-01-01", 10, 8)).await.is_ok());
        assert!(service.record_gate(gate_request("2024-01-01", 5, 6)).await.is_ok());
        assert!(service.record_machine(machine_request("2024-01-01", 3.0)).await.is_ok());

        let rollup = service.gate_rollup(Granularity::Day);
        let first = rollup.first();
        assert_eq!(first.map(|w| (w.totals.entries, w.totals.exits)), Some((15, 14)));

        let total = service.gate_total();
        assert_eq!((total.entries, total.exits), (15, 14));
    }

    #[tokio::test]
    async fn hourly_only_records_land_in_unknown_day_bucket() {
        let dir = tempdir();
        let service = make_service(&dir);

        let mut req = machine_request("2024-01-01", 2.0);
        req.window_day = None;
        req.window_hour = Some("2024-01-01-09".to_string());
        assert!(service.record_machine(req).await.is_ok());

        let by_day = service.machine_rollup(Granularity::Day);
        let windows: Vec<&str> = by_day.iter().map(|w| w.window.as_str()).collect();
        assert_eq!(windows, vec![rollup::UNKNOWN_WINDOW]);

        let by_hour = service.machine_rollup(Granularity::Hour);
        let windows: Vec<&str> = by_hour.iter().map(|w| w.window.as_str()).collect();
        assert_eq!(windows, vec!["2024-01-01-09"]);
    }
}
