use crate::model::*;

use super::utilization::summarize;
use super::validate::*;
use super::{Engine, EngineError};

impl Engine {
    /// Whether `span` still has a free classroom. Unknown locations are empty.
    pub async fn is_available(
        &self,
        location: &str,
        span: Span,
        capacity: Option<u32>,
    ) -> Result<bool, EngineError> {
        validate_location(location)?;
        validate_span(&span)?;
        validate_capacity(capacity)?;
        let Some(rs) = self.get_location(location) else {
            return Ok(true);
        };
        let guard = rs.read().await;
        Ok(guard.occupancy().is_available(&span, capacity))
    }

    /// Occupants recorded under the exact (minute-truncated) slot of `span`.
    pub async fn occupied_count(&self, location: &str, span: Span) -> Result<usize, EngineError> {
        validate_location(location)?;
        validate_span(&span)?;
        let Some(rs) = self.get_location(location) else {
            return Ok(0);
        };
        let guard = rs.read().await;
        Ok(guard.occupancy().exact_count(&span))
    }

    /// Lowest classroom in `[1, capacity]` free for `span`, without reserving it.
    pub async fn find_free_index(
        &self,
        location: &str,
        span: Span,
        capacity: u32,
    ) -> Result<Option<u32>, EngineError> {
        validate_location(location)?;
        validate_span(&span)?;
        validate_capacity(Some(capacity))?;
        let Some(rs) = self.get_location(location) else {
            return Ok(Some(1));
        };
        let guard = rs.read().await;
        Ok(guard.occupancy().find_free_index(&span, capacity))
    }

    pub async fn lookup(&self, session_id: &str) -> Option<AssignmentInfo> {
        let location = self.get_location_for_session(session_id)?;
        let rs = self.get_location(&location)?;
        let guard = rs.read().await;
        guard
            .ledger()
            .get(session_id)
            .map(|a| AssignmentInfo::from_assignment(&location, a))
    }

    /// Live assignments pinned to one classroom, ordered by start.
    pub async fn sessions_on(&self, location: &str, resource: u32) -> Vec<AssignmentInfo> {
        let Some(rs) = self.get_location(location) else {
            return Vec::new();
        };
        let guard = rs.read().await;
        guard
            .ledger()
            .on_resource(resource)
            .into_iter()
            .map(|a| AssignmentInfo::from_assignment(location, a))
            .collect()
    }

    /// Utilization for one location, or for every location sorted by key.
    pub async fn summary(&self, location: Option<&str>) -> Vec<UtilizationSummary> {
        let keys = match location {
            Some(key) => vec![key.to_string()],
            None => self.list_locations(),
        };
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            match self.get_location(&key) {
                Some(rs) => out.push(summarize(&*rs.read().await)),
                None => out.push(UtilizationSummary::empty(&key)),
            }
        }
        out
    }

    pub fn list_locations(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.locations.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}
