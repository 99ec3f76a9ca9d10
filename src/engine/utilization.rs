use crate::model::*;

use super::LocationState;

/// Per-slot occupancy statistics for one location. Read-only.
pub fn summarize(state: &LocationState) -> UtilizationSummary {
    let mut summary = UtilizationSummary::empty(&state.key);
    let mut total = 0usize;

    for (_, occupied) in state.occupancy().slots() {
        let count = occupied.len();
        summary.slot_count += 1;
        summary.max_occupancy = summary.max_occupancy.max(count);
        total += count;
        for resource in occupied {
            *summary.per_resource.entry(resource).or_default() += 1;
        }
    }

    if summary.slot_count > 0 {
        let avg = total as f64 / summary.slot_count as f64;
        summary.avg_occupancy = (avg * 100.0).round() / 100.0;
    }
    summary
}
