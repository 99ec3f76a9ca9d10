//! Replay of an ordered list of reserve/release operations, as produced by the
//! upstream scheduling workflow once it has generated candidate session windows.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::{Engine, EngineError};
use crate::limits::MAX_PLAN_OPS;
use crate::model::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PlanOp {
    Reserve(ReserveRequest),
    Release { session_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub tenant: Option<String>,
    pub ops: Vec<PlanOp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OpOutcome {
    Assigned { session_id: String, resource: u32 },
    NoCapacity { session_id: String, location: String },
    Released { session_id: String, freed: bool },
    Rejected { session_id: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub assigned: usize,
    pub no_capacity: usize,
    pub rejected: usize,
    pub outcomes: Vec<OpOutcome>,
    pub utilization: Vec<UtilizationSummary>,
}

pub fn parse(json: &str) -> Result<Plan, EngineError> {
    let plan: Plan = serde_json::from_str(json).map_err(|e| EngineError::Plan(e.to_string()))?;
    if plan.ops.len() > MAX_PLAN_OPS {
        return Err(EngineError::LimitExceeded("too many plan operations"));
    }
    Ok(plan)
}

/// Apply every op in order. Exhausted capacity and rejected requests are
/// reported per op; the run always completes.
pub async fn run(engine: &Engine, plan: &Plan) -> PlanReport {
    let mut report = PlanReport {
        assigned: 0,
        no_capacity: 0,
        rejected: 0,
        outcomes: Vec::with_capacity(plan.ops.len()),
        utilization: Vec::new(),
    };

    for op in &plan.ops {
        let outcome = match op {
            PlanOp::Reserve(req) => {
                let span = Span {
                    start: req.start,
                    end: req.end,
                };
                let result = engine
                    .reserve_in_group(
                        &req.location,
                        span,
                        &req.session_id,
                        req.group.as_deref(),
                        req.capacity,
                    )
                    .await;
                match result {
                    Ok(Some(resource)) => {
                        report.assigned += 1;
                        OpOutcome::Assigned {
                            session_id: req.session_id.clone(),
                            resource,
                        }
                    }
                    Ok(None) => {
                        report.no_capacity += 1;
                        warn!(
                            location = req.location.as_str(),
                            session_id = req.session_id.as_str(),
                            "no classroom available"
                        );
                        OpOutcome::NoCapacity {
                            session_id: req.session_id.clone(),
                            location: req.location.clone(),
                        }
                    }
                    Err(e) => {
                        report.rejected += 1;
                        warn!(session_id = req.session_id.as_str(), "rejected: {e}");
                        OpOutcome::Rejected {
                            session_id: req.session_id.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            }
            PlanOp::Release { session_id } => OpOutcome::Released {
                session_id: session_id.clone(),
                freed: engine.release(session_id).await,
            },
        };
        report.outcomes.push(outcome);
    }

    report.utilization = engine.summary(None).await;
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "tenant": "acme",
        "ops": [
            {"op": "reserve", "location": "Site-A", "start": 32400000, "end": 36000000, "session_id": "S1", "capacity": 2},
            {"op": "reserve", "location": "Site-A", "start": 32400000, "end": 36000000, "session_id": "S2", "capacity": 2},
            {"op": "reserve", "location": "Site-A", "start": 32400000, "end": 36000000, "session_id": "S3", "capacity": 2},
            {"op": "release", "session_id": "S1"},
            {"op": "release", "session_id": "S1"},
            {"op": "reserve", "location": "Site-A", "start": 36000000, "end": 32400000, "session_id": "S4"},
            {"op": "reserve", "location": "Site-A", "start": 32400000, "end": 36000000, "session_id": "S5", "capacity": 2}
        ]
    }"#;

    #[test]
    fn parse_plan() {
        let plan = parse(PLAN).unwrap();
        assert_eq!(plan.tenant.as_deref(), Some("acme"));
        assert_eq!(plan.ops.len(), 7);
        assert_eq!(
            plan.ops[3],
            PlanOp::Release {
                session_id: "S1".into()
            }
        );
        match &plan.ops[0] {
            PlanOp::Reserve(req) => {
                assert_eq!(req.capacity, Some(2));
                assert_eq!(req.group, None);
            }
            other => panic!("expected reserve, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(parse("{\"ops\": 3}"), Err(EngineError::Plan(_))));
        assert!(matches!(
            parse(r#"{"ops": [{"op": "teleport"}]}"#),
            Err(EngineError::Plan(_))
        ));
    }

    #[tokio::test]
    async fn run_reports_each_outcome() {
        let engine = Engine::new();
        let plan = parse(PLAN).unwrap();
        let report = run(&engine, &plan).await;

        assert_eq!(report.assigned, 3);
        assert_eq!(report.no_capacity, 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(
            report.outcomes[2],
            OpOutcome::NoCapacity {
                session_id: "S3".into(),
                location: "Site-A".into()
            }
        );
        assert_eq!(
            report.outcomes[3],
            OpOutcome::Released {
                session_id: "S1".into(),
                freed: true
            }
        );
        assert_eq!(
            report.outcomes[4],
            OpOutcome::Released {
                session_id: "S1".into(),
                freed: false
            }
        );
        assert!(matches!(report.outcomes[5], OpOutcome::Rejected { .. }));
        assert_eq!(
            report.outcomes[6],
            OpOutcome::Assigned {
                session_id: "S5".into(),
                resource: 1
            }
        );
        assert_eq!(report.utilization.len(), 1);
        assert_eq!(report.utilization[0].max_occupancy, 2);
    }

    #[test]
    fn report_serializes_tagged() {
        let json = serde_json::to_string(&OpOutcome::Assigned {
            session_id: "S1".into(),
            resource: 2,
        })
        .unwrap();
        assert_eq!(json, r#"{"result":"assigned","session_id":"S1","resource":2}"#);
    }
}
