use std::time::Instant;

use tracing::debug;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::allocation::{select_resource, Strategy};
use super::grouping::base_group;
use super::validate::*;
use super::{Engine, EngineError, LocationState};

impl Engine {
    /// Reserve a classroom, grouping by the base group derived from the id.
    ///
    /// `Ok(None)` means no classroom is free for the span; that is an expected
    /// outcome for the caller to handle, not a fault.
    pub async fn reserve(
        &self,
        location: &str,
        span: Span,
        session_id: &str,
        capacity: Option<u32>,
    ) -> Result<Option<u32>, EngineError> {
        self.reserve_in_group(location, span, session_id, None, capacity)
            .await
    }

    /// Reserve with an explicit group key. Sessions sharing a group prefer the
    /// classroom the group already holds at this location.
    pub async fn reserve_in_group(
        &self,
        location: &str,
        span: Span,
        session_id: &str,
        group: Option<&str>,
        capacity: Option<u32>,
    ) -> Result<Option<u32>, EngineError> {
        let started = Instant::now();
        let result = self
            .try_reserve(location, span, session_id, group, capacity)
            .await;

        metrics::counter!(observability::RESERVATIONS_TOTAL, "outcome" => observability::reserve_outcome_label(&result))
            .increment(1);
        metrics::histogram!(observability::RESERVE_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        result
    }

    async fn try_reserve(
        &self,
        location: &str,
        span: Span,
        session_id: &str,
        group: Option<&str>,
        capacity: Option<u32>,
    ) -> Result<Option<u32>, EngineError> {
        validate_location(location)?;
        validate_session_id(session_id)?;
        validate_span(&span)?;
        validate_capacity(capacity)?;
        let group = match group {
            Some(g) => {
                validate_group(g)?;
                g.to_string()
            }
            None => base_group(session_id),
        };

        let (rs, mut guard) = self.lock_location(location).await;
        // Claim and record run under the guard with no await between them.
        let outcome = self.claim_and_record(&mut guard, location, span, session_id, group, capacity);
        if guard.assignment_count() == 0 {
            self.retire_location(location, &rs, &mut guard);
        }
        outcome
    }

    fn claim_and_record(
        &self,
        state: &mut LocationState,
        location: &str,
        span: Span,
        session_id: &str,
        group: String,
        capacity: Option<u32>,
    ) -> Result<Option<u32>, EngineError> {
        self.claim_session(session_id, location)?;
        let outcome = self.select_and_record(state, location, span, session_id, group, capacity);
        if !matches!(outcome, Ok(Some(_))) {
            self.unclaim_session(session_id, location);
        }
        outcome
    }

    fn select_and_record(
        &self,
        state: &mut LocationState,
        location: &str,
        span: Span,
        session_id: &str,
        group: String,
        capacity: Option<u32>,
    ) -> Result<Option<u32>, EngineError> {
        if state.assignment_count() >= MAX_ASSIGNMENTS_PER_LOCATION {
            return Err(EngineError::LimitExceeded("too many assignments at location"));
        }

        let Some(selection) = select_resource(state, &span, &group, capacity) else {
            debug!(location, session_id, ?capacity, "no classroom free for [{}, {})", span.start, span.end);
            return Ok(None);
        };

        if state.assignment_count() == 0 {
            self.admit_location()?;
        }

        if let Strategy::Displaced { preferred } = selection.strategy {
            metrics::counter!(observability::GROUP_CONFLICTS_TOTAL).increment(1);
            debug!(
                location,
                session_id,
                group = group.as_str(),
                preferred,
                assigned = selection.resource,
                "group classroom occupied, assigning another"
            );
        }

        state.record(session_id, span, selection.resource, group);
        debug!(
            location,
            session_id,
            resource = selection.resource,
            strategy = ?selection.strategy,
            "reserved"
        );
        Ok(Some(selection.resource))
    }

    /// Reserve a sequence of requests in order. Each request stands alone: a
    /// failure or exhaustion does not undo earlier ones.
    pub async fn reserve_batch(
        &self,
        requests: &[ReserveRequest],
    ) -> Result<Vec<Result<Option<u32>, EngineError>>, EngineError> {
        if requests.len() > MAX_BATCH_SIZE {
            return Err(EngineError::LimitExceeded("batch too large"));
        }
        let mut outcomes = Vec::with_capacity(requests.len());
        for req in requests {
            let span = Span {
                start: req.start,
                end: req.end,
            };
            outcomes.push(
                self.reserve_in_group(
                    &req.location,
                    span,
                    &req.session_id,
                    req.group.as_deref(),
                    req.capacity,
                )
                .await,
            );
        }
        Ok(outcomes)
    }

    /// Free the session's classroom. `false` if the session held nothing.
    pub async fn release(&self, session_id: &str) -> bool {
        let Some((location, rs, mut guard)) = self.resolve_session_write(session_id).await else {
            metrics::counter!(observability::RELEASES_TOTAL, "outcome" => "not_found").increment(1);
            return false;
        };
        let Some(released) = guard.release(session_id) else {
            metrics::counter!(observability::RELEASES_TOTAL, "outcome" => "not_found").increment(1);
            return false;
        };
        self.unclaim_session(session_id, &location);
        if guard.assignment_count() == 0 {
            self.vacate_location();
            self.retire_location(&location, &rs, &mut guard);
        }
        drop(guard);

        metrics::counter!(observability::RELEASES_TOTAL, "outcome" => "freed").increment(1);
        debug!(location = location.as_str(), session_id, resource = released.resource, "released");
        true
    }

    /// Release every assignment at a location. Returns how many were freed.
    pub async fn release_location(&self, location: &str) -> usize {
        let Some(rs) = self.get_location(location) else {
            return 0;
        };
        let mut guard = rs.clone().write_owned().await;
        if guard.is_retired() {
            return 0;
        }
        let released = guard.release_all();
        for a in &released {
            self.unclaim_session(&a.session_id, location);
        }
        if !released.is_empty() {
            self.vacate_location();
        }
        self.retire_location(location, &rs, &mut guard);
        drop(guard);
        metrics::counter!(observability::RELEASES_TOTAL, "outcome" => "freed")
            .increment(released.len() as u64);
        tracing::info!(location, count = released.len(), "released all assignments");
        released.len()
    }
}
