//! Validated ticket identifier.
//!
//! [`TicketId`] is a newtype over the identifier printed on a physical
//! ticket. Identifiers are caller-supplied opaque strings; the only
//! invariant is that they are non-empty after trimming, which every
//! recording path depends on (an empty id would collapse distinct
//! tickets into one index entry).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of one physical ticket.
///
/// Used as the key of the ticket index and the filter for per-ticket
/// history reads of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Parses a raw identifier, trimming surrounding whitespace.
    ///
    /// Returns `None` when the trimmed value is empty.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TicketId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
