use crate::model::*;

use super::LocationState;

/// How a classroom was picked. Carried out of the pure selection step so the
/// engine can log and count decisions without re-deriving them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// No capacity or capacity 1: lowest free index.
    FirstFit,
    /// Reused the classroom another part of the same group already holds.
    Preferred,
    /// New group: free classroom carrying the fewest distinct groups.
    Balanced,
    /// The group's classroom was taken for this span; balanced among the rest.
    Displaced { preferred: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub resource: u32,
    pub strategy: Strategy,
}

/// Pick a classroom for `span` at this location, or `None` when every index in
/// `[1, capacity]` is occupied for the span. Never mutates state; the caller
/// records the result under the same write guard.
pub fn select_resource(
    state: &LocationState,
    span: &Span,
    group: &str,
    capacity: Option<u32>,
) -> Option<Selection> {
    match capacity {
        Some(cap) if cap > 1 => select_balanced(state, span, group, cap),
        _ => state
            .occupancy()
            .first_fit(span, capacity)
            .map(|resource| Selection {
                resource,
                strategy: Strategy::FirstFit,
            }),
    }
}

fn select_balanced(state: &LocationState, span: &Span, group: &str, capacity: u32) -> Option<Selection> {
    let taken = state.occupancy().overlapping_occupants(span);
    let preferred = state.ledger().preferred_resource(group);

    if let Some(p) = preferred
        && p <= capacity
        && !taken.contains(&p)
    {
        return Some(Selection {
            resource: p,
            strategy: Strategy::Preferred,
        });
    }

    let load = state.ledger().distinct_groups_per_resource();
    // min_by_key keeps the first minimum, so ties go to the lowest index.
    let resource = (1..=capacity)
        .filter(|i| !taken.contains(i))
        .min_by_key(|i| load.get(i).copied().unwrap_or(0))?;

    let strategy = match preferred {
        Some(p) => Strategy::Displaced { preferred: p },
        None => Strategy::Balanced,
    };
    Some(Selection { resource, strategy })
}
