//! Derived per-ticket index entries and the merge fold that builds them.
//!
//! The index holds the latest known state of every ticket ever seen. It is
//! maintained incrementally, but its contents are defined purely as a fold
//! over the event log: [`IndexUpdate::for_event`] maps an event to a
//! partial update and [`IndexEntry::apply`] merges it field-wise. The
//! incremental path and the rebuild-by-replay path share these two
//! functions, so the two views cannot drift apart in what they compute.
//!
//! Merge semantics are last-writer-wins per field in arrival order: a
//! field is overwritten only when the update carries it, so an update that
//! omits a field never erases an earlier value.

use serde::{Deserialize, Serialize};

use super::ticket_event::{StatusAction, TicketEvent};

/// Latest known lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    /// Issued, not yet through a gate.
    Sold,
    /// Last seen entering a gate.
    Entered,
    /// Last seen exiting a gate.
    Exited,
}

/// Kind of the last event folded into an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Ticket issuance.
    Sale,
    /// Gate crossing or trips update.
    Status,
}

/// Latest-known snapshot of one ticket, derived from its events.
///
/// Every field except `last_update_ts` is optional: a field is `None`
/// until some event has reported it. `last_update_ts` is server-assigned
/// ingest time (the moment the index was mutated), deliberately not the
/// event's own, possibly skewed, timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Lifecycle status after the latest status-bearing event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    /// Kind of the last event seen for this ticket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<EventKind>,
    /// Action of the last status event, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<StatusAction>,
    /// Origin station from the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Destination/terminal station from the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    /// Fare class from the sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fare_class: Option<String>,
    /// Trips purchased at sale time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trips_total: Option<u32>,
    /// Code of the issuing station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_code: Option<String>,
    /// Name of the issuing station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    /// Amount paid at sale time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Station touched by the last status event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_station_code: Option<String>,
    /// Remaining-trips counter, if ever reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trips_remaining: Option<u32>,
    /// Server-assigned time of the last index mutation (epoch ms).
    #[serde(default)]
    pub last_update_ts: i64,
}

/// Partial update derived from one event.
///
/// Field presence, not field value, decides what [`IndexEntry::apply`]
/// overwrites.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexUpdate {
    /// New lifecycle status, when the event implies one.
    pub status: Option<TicketStatus>,
    /// Kind of the event.
    pub last_event: Option<EventKind>,
    /// Action of a status event.
    pub last_action: Option<StatusAction>,
    /// Origin station carried by a sale.
    pub origin: Option<String>,
    /// Terminal station carried by a sale.
    pub terminal: Option<String>,
    /// Fare class carried by a sale.
    pub fare_class: Option<String>,
    /// Trips purchased carried by a sale.
    pub trips_total: Option<u32>,
    /// Issuing station code carried by a sale.
    pub station_code: Option<String>,
    /// Issuing station name carried by a sale.
    pub station_name: Option<String>,
    /// Cost carried by a sale.
    pub cost: Option<f64>,
    /// Station touched by a status event.
    pub last_station_code: Option<String>,
    /// Remaining trips reported by a status event.
    pub trips_remaining: Option<u32>,
}

impl IndexUpdate {
    /// Maps one event to the partial update it contributes to the index.
    ///
    /// This is the single source of the index semantics: the incremental
    /// upsert path and the rebuild-by-replay path both go through here.
    #[must_use]
    pub fn for_event(event: &TicketEvent) -> Self {
        match event {
            TicketEvent::Sale {
                origin,
                terminal,
                fare_class,
                trips_total,
                station_code,
                station_name,
                cost,
                ..
            } => Self {
                status: Some(TicketStatus::Sold),
                last_event: Some(EventKind::Sale),
                origin: Some(origin.clone()),
                terminal: Some(terminal.clone()),
                fare_class: Some(fare_class.clone()),
                trips_total: Some(*trips_total),
                station_code: Some(station_code.clone()),
                station_name: Some(station_name.clone()),
                cost: Some(*cost),
                ..Self::default()
            },
            TicketEvent::Status {
                action,
                station_code,
                trips_remaining,
                ..
            } => Self {
                status: match action {
                    StatusAction::Enter => Some(TicketStatus::Entered),
                    StatusAction::Exit => Some(TicketStatus::Exited),
                    StatusAction::Update => None,
                },
                last_event: Some(EventKind::Status),
                last_action: Some(*action),
                last_station_code: Some(station_code.clone()),
                trips_remaining: *trips_remaining,
                ..Self::default()
            },
        }
    }
}

impl IndexEntry {
    /// Merges a partial update into this entry.
    ///
    /// Only fields present in the update are overwritten. Does not touch
    /// `last_update_ts`; the store stamps it at mutation time.
    pub fn apply(&mut self, update: IndexUpdate) {
        let IndexUpdate {
            status,
            last_event,
            last_action,
            origin,
            terminal,
            fare_class,
            trips_total,
            station_code,
            station_name,
            cost,
            last_station_code,
            trips_remaining,
        } = update;
        merge_field(&mut self.status, status);
        merge_field(&mut self.last_event, last_event);
        merge_field(&mut self.last_action, last_action);
        merge_field(&mut self.origin, origin);
        merge_field(&mut self.terminal, terminal);
        merge_field(&mut self.fare_class, fare_class);
        merge_field(&mut self.trips_total, trips_total);
        merge_field(&mut self.station_code, station_code);
        merge_field(&mut self.station_name, station_name);
        merge_field(&mut self.cost, cost);
        merge_field(&mut self.last_station_code, last_station_code);
        merge_field(&mut self.trips_remaining, trips_remaining);
    }

    /// Case-insensitive substring match against the searchable fields:
    /// the ticket identifier, issuing station code, origin, and terminal.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches(&self, ticket_id: &str, needle: &str) -> bool {
        let field_contains =
            |field: &Option<String>| field.as_deref().is_some_and(|v| v.to_lowercase().contains(needle));
        ticket_id.to_lowercase().contains(needle)
            || field_contains(&self.station_code)
            || field_contains(&self.origin)
            || field_contains(&self.terminal)
    }
}

fn merge_field<T>(slot: &mut Option<T>, update: Option<T>) {
    if let Some(value) = update {
        *slot = Some(value);
    }
}
