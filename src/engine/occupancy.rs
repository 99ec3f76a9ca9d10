use std::collections::{BTreeMap, BTreeSet};

use crate::model::*;

/// Per-location map from slot key to the classrooms occupied in that slot.
///
/// Each occupant keeps its exact span so overlap is always decided on real
/// instants, never on minute-truncated keys. Two sub-minute sessions sharing a
/// key without overlapping may hold the same index, hence a span list per index.
#[derive(Debug, Clone, Default)]
pub struct OccupancyIndex {
    slots: BTreeMap<SlotKey, BTreeMap<u32, Vec<Span>>>,
}

impl OccupancyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn insert(&mut self, slot: SlotKey, resource: u32, span: Span) {
        self.slots
            .entry(slot)
            .or_default()
            .entry(resource)
            .or_default()
            .push(span);
    }

    /// Remove an occupant. Empty slot entries are pruned immediately.
    pub fn remove(&mut self, slot: &SlotKey, resource: u32, span: &Span) -> bool {
        let Some(occupants) = self.slots.get_mut(slot) else {
            return false;
        };
        let mut removed = false;
        if let Some(spans) = occupants.get_mut(&resource) {
            if let Some(pos) = spans.iter().position(|s| s == span) {
                spans.swap_remove(pos);
                removed = true;
            }
            if spans.is_empty() {
                occupants.remove(&resource);
            }
        }
        if occupants.is_empty() {
            self.slots.remove(slot);
        }
        removed
    }

    pub fn contains(&self, slot: &SlotKey, resource: u32) -> bool {
        self.slots
            .get(slot)
            .is_some_and(|occupants| occupants.contains_key(&resource))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Occupants recorded under the exact slot key of `span`.
    pub fn exact_count(&self, span: &Span) -> usize {
        self.slots.get(&SlotKey::of(span)).map_or(0, BTreeMap::len)
    }

    /// Iterate `(slot, occupied indices)` in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (&SlotKey, Vec<u32>)> {
        self.slots
            .iter()
            .map(|(k, occupants)| (k, occupants.keys().copied().collect()))
    }

    /// Union of resource indices held by any occupant overlapping `query`.
    pub fn overlapping_occupants(&self, query: &Span) -> BTreeSet<u32> {
        // A slot's truncated start is <= its occupants' exact starts, so slots
        // starting at or after query.end cannot overlap.
        let bound = SlotKey {
            start: query.end,
            end: Ms::MIN,
        };
        let mut taken = BTreeSet::new();
        for (_, occupants) in self.slots.range(..bound) {
            for (&resource, spans) in occupants {
                if spans.iter().any(|s| s.overlaps(query)) {
                    taken.insert(resource);
                }
            }
        }
        taken
    }

    /// `None` capacity means an unbounded pool, which is always available.
    pub fn is_available(&self, query: &Span, capacity: Option<u32>) -> bool {
        let Some(capacity) = capacity else {
            return true;
        };
        let capacity = capacity as usize;

        // Exact-key short circuit: only occupants that really overlap the
        // query count, so this never disagrees with the full scan below.
        if let Some(occupants) = self.slots.get(&SlotKey::of(query)) {
            let overlapping = occupants
                .values()
                .filter(|spans| spans.iter().any(|s| s.overlaps(query)))
                .count();
            if overlapping >= capacity {
                return false;
            }
        }

        self.overlapping_occupants(query).len() < capacity
    }

    /// Smallest index in `[1, capacity]` not held by an overlapping occupant.
    pub fn find_free_index(&self, query: &Span, capacity: u32) -> Option<u32> {
        let taken = self.overlapping_occupants(query);
        (1..=capacity).find(|i| !taken.contains(i))
    }

    /// Plain first fit: probe from 1 upward. With a capacity, give up past it.
    pub fn first_fit(&self, query: &Span, capacity: Option<u32>) -> Option<u32> {
        let taken = self.overlapping_occupants(query);
        let mut candidate = 1u32;
        while taken.contains(&candidate) {
            candidate += 1;
        }
        match capacity {
            Some(cap) if candidate > cap => None,
            _ => Some(candidate),
        }
    }
}
