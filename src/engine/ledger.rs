use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::*;

/// Session id → live assignment, for one location.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    assignments: HashMap<String, Assignment>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn get(&self, session_id: &str) -> Option<&Assignment> {
        self.assignments.get(session_id)
    }

    /// Upsert; returns the replaced assignment, if any.
    pub fn insert(&mut self, assignment: Assignment) -> Option<Assignment> {
        self.assignments
            .insert(assignment.session_id.clone(), assignment)
    }

    pub fn remove(&mut self, session_id: &str) -> Option<Assignment> {
        self.assignments.remove(session_id)
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Assignment> + '_ {
        self.assignments.drain().map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    /// Assignments pinned to `resource`, ordered by start then session id.
    pub fn on_resource(&self, resource: u32) -> Vec<&Assignment> {
        let mut pinned: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| a.resource == resource)
            .collect();
        pinned.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        pinned
    }

    /// Resource already used by this group here. Earliest start wins, ties to
    /// the lowest index, so the answer does not depend on map iteration order.
    pub fn preferred_resource(&self, group: &str) -> Option<u32> {
        self.assignments
            .values()
            .filter(|a| a.group == group)
            .min_by_key(|a| (a.span.start, a.resource))
            .map(|a| a.resource)
    }

    /// Number of distinct groups holding each resource. Split parts of one
    /// group count once.
    pub fn distinct_groups_per_resource(&self) -> BTreeMap<u32, usize> {
        let mut groups: BTreeMap<u32, BTreeSet<&str>> = BTreeMap::new();
        for a in self.assignments.values() {
            groups.entry(a.resource).or_default().insert(a.group.as_str());
        }
        groups.into_iter().map(|(r, g)| (r, g.len())).collect()
    }
}
