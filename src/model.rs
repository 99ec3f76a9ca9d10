use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unix milliseconds. The only time type.
pub type Ms = i64;

/// One minute in ms. Slot keys are truncated to this granularity.
pub const MINUTE_MS: Ms = 60_000;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    /// A session ending exactly when another begins does not overlap it.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Canonical slot identifier: both ends truncated to whole minutes.
///
/// Ordered by `(start, end)` so the occupancy index can stop scanning once
/// slots start at or after a query's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub start: Ms,
    pub end: Ms,
}

impl SlotKey {
    pub fn of(span: &Span) -> Self {
        Self {
            start: truncate_to_minute(span.start),
            end: truncate_to_minute(span.end),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.start, self.end)
    }
}

pub fn truncate_to_minute(t: Ms) -> Ms {
    t - t.rem_euclid(MINUTE_MS)
}

/// `"<start>|<end>"` with both instants truncated to the minute.
pub fn slot_key(start: Ms, end: Ms) -> String {
    SlotKey {
        start: truncate_to_minute(start),
        end: truncate_to_minute(end),
    }
    .to_string()
}

/// A live classroom assignment held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub session_id: String,
    pub slot: SlotKey,
    pub resource: u32,
    /// Exact instants, kept for overlap checks independent of slot truncation.
    pub span: Span,
    /// Group key the session was reserved under (explicit or derived).
    pub group: String,
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentInfo {
    pub session_id: String,
    pub location: String,
    pub slot: String,
    pub resource: u32,
    pub start: Ms,
    pub end: Ms,
    pub group: String,
}

impl AssignmentInfo {
    pub fn from_assignment(location: &str, a: &Assignment) -> Self {
        Self {
            session_id: a.session_id.clone(),
            location: location.to_string(),
            slot: a.slot.to_string(),
            resource: a.resource,
            start: a.span.start,
            end: a.span.end,
            group: a.group.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSummary {
    pub location: String,
    pub slot_count: usize,
    pub max_occupancy: usize,
    /// Mean of per-slot occupant counts, rounded to 2 decimals.
    pub avg_occupancy: f64,
    /// Resource index → number of slots it appears in.
    pub per_resource: BTreeMap<u32, usize>,
}

impl UtilizationSummary {
    pub fn empty(location: &str) -> Self {
        Self {
            location: location.to_string(),
            slot_count: 0,
            max_occupancy: 0,
            avg_occupancy: 0.0,
            per_resource: BTreeMap::new(),
        }
    }
}

/// One request in a batch reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveRequest {
    pub location: String,
    pub start: Ms,
    pub end: Ms,
    pub session_id: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}
