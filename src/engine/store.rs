use crate::model::*;

use super::{Ledger, OccupancyIndex};

/// Everything the engine knows about one location. The occupancy index and
/// the ledger only change together, through `record` and `release`.
#[derive(Debug, Clone)]
pub struct LocationState {
    pub key: String,
    occupancy: OccupancyIndex,
    ledger: Ledger,
    /// Set once the entry has been dropped from the engine's map.
    retired: bool,
}

impl LocationState {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            occupancy: OccupancyIndex::new(),
            ledger: Ledger::new(),
            retired: false,
        }
    }

    pub fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn assignment_count(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub(super) fn retire(&mut self) {
        self.retired = true;
    }

    /// Store the assignment and mark its index occupied for its slot. Returns
    /// the assignment it replaced, if the session was already held here.
    pub fn record(&mut self, session_id: &str, span: Span, resource: u32, group: String) -> Option<Assignment> {
        let slot = SlotKey::of(&span);
        let previous = self.ledger.insert(Assignment {
            session_id: session_id.to_string(),
            slot,
            resource,
            span,
            group,
        });
        if let Some(previous) = &previous {
            self.occupancy
                .remove(&previous.slot, previous.resource, &previous.span);
        }
        self.occupancy.insert(slot, resource, span);
        previous
    }

    /// Free the session's classroom. `None` if the session is not held here.
    pub fn release(&mut self, session_id: &str) -> Option<Assignment> {
        let assignment = self.ledger.remove(session_id)?;
        self.occupancy
            .remove(&assignment.slot, assignment.resource, &assignment.span);
        Some(assignment)
    }

    /// Drop every assignment at this location.
    pub fn release_all(&mut self) -> Vec<Assignment> {
        let released: Vec<Assignment> = self.ledger.drain().collect();
        self.occupancy.clear();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: Ms = 3_600_000;

    #[test]
    fn record_marks_slot_occupied() {
        let mut ls = LocationState::new("Site-A");
        let span = Span::new(9 * H, 10 * H);
        assert!(ls.record("S1", span, 2, "S1".into()).is_none());
        let a = ls.ledger().get("S1").unwrap();
        assert_eq!(a.resource, 2);
        assert_eq!(a.slot, SlotKey::of(&span));
        assert!(ls.occupancy().contains(&a.slot, 2));
        assert_eq!(ls.assignment_count(), 1);
    }

    #[test]
    fn release_removes_both_sides() {
        let mut ls = LocationState::new("Site-A");
        let span = Span::new(9 * H, 10 * H);
        ls.record("S1", span, 1, "S1".into());
        let released = ls.release("S1").unwrap();
        assert_eq!(released.resource, 1);
        assert!(ls.occupancy().is_empty());
        assert!(ls.ledger().is_empty());
        assert!(ls.release("S1").is_none());
    }

    #[test]
    fn overwrite_does_not_leak_occupancy() {
        let mut ls = LocationState::new("Site-A");
        ls.record("S1", Span::new(9 * H, 10 * H), 1, "S1".into());
        let replaced = ls.record("S1", Span::new(11 * H, 12 * H), 2, "S1".into());
        assert_eq!(replaced.map(|a| a.resource), Some(1));
        assert_eq!(ls.occupancy().slot_count(), 1);
        assert!(ls.occupancy().is_available(&Span::new(9 * H, 10 * H), Some(1)));
    }

    #[test]
    fn release_all_clears_location() {
        let mut ls = LocationState::new("Site-A");
        ls.record("S1", Span::new(9 * H, 10 * H), 1, "S1".into());
        ls.record("S2", Span::new(9 * H, 10 * H), 2, "S2".into());
        let released = ls.release_all();
        assert_eq!(released.len(), 2);
        assert!(ls.occupancy().is_empty());
        assert_eq!(ls.assignment_count(), 0);
    }
}
