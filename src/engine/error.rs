use crate::model::Span;

/// Contract violations and limits. "No capacity" and "not found on release"
/// are ordinary return values, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    InvalidSpan(Span),
    InvalidCapacity(u32),
    EmptySessionId,
    EmptyLocation,
    InvalidTenant(String),
    AlreadyReserved {
        session_id: String,
        location: String,
    },
    LimitExceeded(&'static str),
    Plan(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidSpan(span) => {
                write!(f, "invalid span [{}, {}): end must be after start", span.start, span.end)
            }
            EngineError::InvalidCapacity(cap) => {
                write!(f, "invalid capacity {cap}: must be at least 1")
            }
            EngineError::EmptySessionId => write!(f, "session id must not be empty"),
            EngineError::EmptyLocation => write!(f, "location key must not be empty"),
            EngineError::InvalidTenant(name) => write!(f, "invalid tenant name: {name:?}"),
            EngineError::AlreadyReserved {
                session_id,
                location,
            } => write!(
                f,
                "session {session_id} already holds a classroom at {location}; release it first"
            ),
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Plan(msg) => write!(f, "plan error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
