mod allocation;
mod error;
mod grouping;
mod ledger;
mod mutations;
mod occupancy;
mod queries;
mod store;
mod utilization;
mod validate;

pub use allocation::{select_resource, Selection, Strategy};
pub use error::EngineError;
pub use grouping::base_group;
pub use ledger::Ledger;
pub use occupancy::OccupancyIndex;
pub use store::LocationState;
pub use utilization::summarize;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::limits::*;
use crate::observability;

pub type SharedLocationState = Arc<RwLock<LocationState>>;

/// Classroom allocation engine. One instance per tenant; construct it once
/// and share it by `Arc`.
///
/// Locking: one `RwLock` per location key, so locations never block each
/// other. Every read-check-then-record sequence runs under that location's
/// write guard, and a session id is only claimed while that guard is held.
pub struct Engine {
    pub(super) locations: DashMap<String, SharedLocationState>,
    /// Reverse lookup: session id → location key. Makes ids unique engine-wide.
    pub(super) session_to_location: DashMap<String, String>,
    /// Locations holding at least one assignment. Bounded by
    /// `MAX_LOCATIONS_PER_TENANT`.
    live_locations: AtomicUsize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            locations: DashMap::new(),
            session_to_location: DashMap::new(),
            live_locations: AtomicUsize::new(0),
        }
    }

    pub fn get_location(&self, key: &str) -> Option<SharedLocationState> {
        self.locations.get(key).map(|e| e.value().clone())
    }

    /// Locations currently holding assignments.
    pub fn location_count(&self) -> usize {
        self.live_locations.load(Ordering::Acquire)
    }

    pub fn get_location_for_session(&self, session_id: &str) -> Option<String> {
        self.session_to_location
            .get(session_id)
            .map(|e| e.value().clone())
    }

    /// Write-lock the location, creating its entry if needed. An entry retired
    /// while we waited is gone from the map; look it up again.
    pub(super) async fn lock_location(
        &self,
        key: &str,
    ) -> (SharedLocationState, OwnedRwLockWriteGuard<LocationState>) {
        loop {
            let rs = self
                .locations
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(LocationState::new(key))))
                .value()
                .clone();
            let guard = rs.clone().write_owned().await;
            if !guard.is_retired() {
                return (rs, guard);
            }
        }
    }

    /// Drop an empty location from the map. Callers still holding its `Arc`
    /// see it retired once they get the lock.
    pub(super) fn retire_location(&self, key: &str, rs: &SharedLocationState, state: &mut LocationState) {
        debug_assert_eq!(state.assignment_count(), 0);
        state.retire();
        self.locations.remove_if(key, |_, current| Arc::ptr_eq(current, rs));
    }

    /// Count a location as live before its first assignment is recorded.
    pub(super) fn admit_location(&self) -> Result<(), EngineError> {
        self.live_locations
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < MAX_LOCATIONS_PER_TENANT).then_some(n + 1)
            })
            .map_err(|_| EngineError::LimitExceeded("too many locations"))?;
        metrics::gauge!(observability::LOCATIONS_ACTIVE).increment(1.0);
        Ok(())
    }

    /// A live location lost its last assignment.
    pub(super) fn vacate_location(&self) {
        self.live_locations.fetch_sub(1, Ordering::AcqRel);
        metrics::gauge!(observability::LOCATIONS_ACTIVE).decrement(1.0);
    }

    /// Claim a session id for `location`. Fails if the id is already live.
    pub(super) fn claim_session(&self, session_id: &str, location: &str) -> Result<(), EngineError> {
        match self.session_to_location.entry(session_id.to_string()) {
            Entry::Occupied(e) => Err(EngineError::AlreadyReserved {
                session_id: session_id.to_string(),
                location: e.get().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(location.to_string());
                Ok(())
            }
        }
    }

    pub(super) fn unclaim_session(&self, session_id: &str, location: &str) {
        self.session_to_location
            .remove_if(session_id, |_, claimed| claimed == location);
    }

    /// Lookup session → location, get the location, acquire its write lock.
    pub(super) async fn resolve_session_write(
        &self,
        session_id: &str,
    ) -> Option<(String, SharedLocationState, OwnedRwLockWriteGuard<LocationState>)> {
        loop {
            let location = self.get_location_for_session(session_id)?;
            let rs = self.get_location(&location)?;
            let guard = rs.clone().write_owned().await;
            if !guard.is_retired() {
                return Some((location, rs, guard));
            }
        }
    }
}
