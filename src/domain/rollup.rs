//! Windowed aggregation engine over raw telemetry records.
//!
//! Stateless reductions: group records by the chosen window key and sum
//! every metric of the record family, or compute one running total across
//! all records. Both record families (ticket machines, gates) plug in via
//! the [`Rollup`] trait. Reads are always a fresh full scan; telemetry
//! volume is bounded, so no materialized view is kept.

use std::collections::BTreeMap;

use serde::Serialize;

use super::telemetry::{GateRecord, Granularity, MachineRecord, WindowKey};

/// Bucket label for records that lack the requested window key.
///
/// Sorts after every canonical window key, so it always appears last.
pub const UNKNOWN_WINDOW: &str = "unknown";

/// A telemetry record family that can be reduced into per-window sums.
pub trait Rollup {
    /// Accumulated metrics for this family; starts all-zero.
    type Totals: Default + Serialize;

    /// The record's key for the given granularity, if it has one.
    fn window(&self, granularity: Granularity) -> Option<&WindowKey>;

    /// Adds this record's metrics into the running totals.
    fn fold_into(&self, totals: &mut Self::Totals);
}

/// Summed ticket-machine metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MachineTotals {
    /// Tickets sold.
    pub sold_tickets: u64,
    /// Trips sold.
    pub sold_trips: u64,
    /// Revenue taken.
    pub revenue: f64,
}

/// Summed gate metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GateTotals {
    /// Gate entries.
    pub entries: u64,
    /// Gate exits.
    pub exits: u64,
}

impl Rollup for MachineRecord {
    type Totals = MachineTotals;

    fn window(&self, granularity: Granularity) -> Option<&WindowKey> {
        match granularity {
            Granularity::Hour => self.window_hour.as_ref(),
            Granularity::Day => self.window_day.as_ref(),
        }
    }

    fn fold_into(&self, totals: &mut MachineTotals) {
        totals.sold_tickets = totals.sold_tickets.saturating_add(self.sold_tickets);
        totals.sold_trips = totals.sold_trips.saturating_add(self.sold_trips);
        totals.revenue += self.revenue;
    }
}

impl Rollup for GateRecord {
    type Totals = GateTotals;

    fn window(&self, granularity: Granularity) -> Option<&WindowKey> {
        match granularity {
            Granularity::Hour => self.window_hour.as_ref(),
            Granularity::Day => self.window_day.as_ref(),
        }
    }

    fn fold_into(&self, totals: &mut GateTotals) {
        totals.entries = totals.entries.saturating_add(self.entries);
        totals.exits = totals.exits.saturating_add(self.exits);
    }
}

/// One aggregation bucket: window label plus the family's summed metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowTotals<T> {
    /// Window label (`YYYY-MM-DD`, `YYYY-MM-DD-HH`, or `unknown`).
    pub window: String,
    /// Summed metrics for the window.
    #[serde(flatten)]
    pub totals: T,
}

/// Groups records by the chosen window key and sums each group.
///
/// Records without that key land in the synthetic [`UNKNOWN_WINDOW`]
/// bucket rather than being dropped. The result is ascending by lexical
/// window order, which is chronological order because window keys are
/// validated fixed-width forms.
pub fn aggregate_by<R: Rollup>(records: &[R], granularity: Granularity) -> Vec<WindowTotals<R::Totals>> {
    let mut buckets: BTreeMap<String, R::Totals> = BTreeMap::new();
    for record in records {
        let window = record
            .window(granularity)
            .map_or(UNKNOWN_WINDOW, WindowKey::as_str);
        record.fold_into(buckets.entry(window.to_string()).or_default());
    }
    buckets
        .into_iter()
        .map(|(window, totals)| WindowTotals { window, totals })
        .collect()
}

/// Sums every record into one running total regardless of window.
pub fn aggregate_total<R: Rollup>(records: &[R]) -> R::Totals {
    let mut totals = R::Totals::default();
    for record in records {
        record.fold_into(&mut totals);
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(day: Option<&str>, hour: Option<&str>, revenue: f64) -> MachineRecord {
        MachineRecord {
            device: "ticket_machine".to_string(),
            station_code: "01-01".to_string(),
            station_name: String::new(),
            sold_tickets: 1,
            sold_trips: 2,
            revenue,
            ts: 0,
            window_hour: hour.and_then(|h| WindowKey::hour(h).ok()),
            window_day: day.and_then(|d| WindowKey::day(d).ok()),
        }
    }

    #[test]
    fn by_day_sums_and_sorts_ascending() {
        let records = vec![
            machine(Some("2024-01-02"), None, 7.0),
            machine(Some("2024-01-01"), None, 10.0),
            machine(Some("2024-01-01"), None, 5.0),
        ];
        let rollup = aggregate_by(&records, Granularity::Day);
        let summary: Vec<(&str, f64, u64)> = rollup
            .iter()
            .map(|w| (w.window.as_str(), w.totals.revenue, w.totals.sold_tickets))
            .collect();
        assert_eq!(
            summary,
            vec![("2024-01-01", 15.0, 2), ("2024-01-02", 7.0, 1)]
        );
    }

    #[test]
    fn total_sums_across_all_windows() {
        let records = vec![
            machine(Some("2024-01-01"), None, 10.0),
            machine(Some("2024-01-01"), None, 5.0),
            machine(Some("2024-01-02"), None, 7.0),
        ];
        let totals = aggregate_total(&records);
        assert_eq!(totals.revenue, 22.0);
        assert_eq!(totals.sold_tickets, 3);
        assert_eq!(totals.sold_trips, 6);
    }

    #[test]
    fn missing_window_key_goes_to_unknown_bucket_last() {
        let records = vec![
            machine(None, Some("2024-01-01-09"), 3.0),
            machine(Some("2024-01-01"), None, 4.0),
        ];
        // The hourly-only record has no day window.
        let rollup = aggregate_by(&records, Granularity::Day);
        let windows: Vec<&str> = rollup.iter().map(|w| w.window.as_str()).collect();
        assert_eq!(windows, vec!["2024-01-01", UNKNOWN_WINDOW]);
    }

    #[test]
    fn sparse_record_contributes_zero_not_a_fault() {
        let sparse: Option<MachineRecord> =
            serde_json::from_str(r#"{"device":"ticket_machine","window_day":"2024-01-01"}"#).ok();
        let records: Vec<MachineRecord> = sparse.into_iter().collect();
        let totals = aggregate_total(&records);
        assert_eq!(totals.sold_trips, 0);
        assert_eq!(totals.revenue, 0.0);
    }

    #[test]
    fn gate_rollup_sums_entries_and_exits() {
        let records = vec![
            GateRecord {
                device: "gate".to_string(),
                station_code: "02-01".to_string(),
                entries: 10,
                exits: 8,
                ts: 0,
                window_hour: None,
                window_day: WindowKey::day("2024-01-01").ok(),
            },
            GateRecord {
                device: "gate".to_string(),
                station_code: "02-01".to_string(),
                entries: 5,
                exits: 6,
                ts: 0,
                window_hour: None,
                window_day: WindowKey::day("2024-01-01").ok(),
            },
        ];
        let rollup = aggregate_by(&records, Granularity::Day);
        let first = rollup.first();
        assert_eq!(first.map(|w| (w.totals.entries, w.totals.exits)), Some((15, 14)));
        assert_eq!(rollup.len(), 1);
    }
}
