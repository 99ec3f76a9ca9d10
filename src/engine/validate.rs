use crate::limits::*;
use crate::model::*;

use super::EngineError;

pub(crate) fn validate_span(span: &Span) -> Result<(), EngineError> {
    if span.end <= span.start {
        return Err(EngineError::InvalidSpan(*span));
    }
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    if span.duration_ms() > MAX_SPAN_DURATION_MS {
        return Err(EngineError::LimitExceeded("span too wide"));
    }
    Ok(())
}

pub(crate) fn validate_capacity(capacity: Option<u32>) -> Result<(), EngineError> {
    match capacity {
        Some(0) => Err(EngineError::InvalidCapacity(0)),
        Some(cap) if cap > MAX_CAPACITY => Err(EngineError::LimitExceeded("capacity too large")),
        _ => Ok(()),
    }
}

pub(crate) fn validate_location(location: &str) -> Result<(), EngineError> {
    if location.is_empty() {
        return Err(EngineError::EmptyLocation);
    }
    if location.len() > MAX_LOCATION_KEY_LEN {
        return Err(EngineError::LimitExceeded("location key too long"));
    }
    Ok(())
}

pub(crate) fn validate_session_id(session_id: &str) -> Result<(), EngineError> {
    if session_id.is_empty() {
        return Err(EngineError::EmptySessionId);
    }
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(EngineError::LimitExceeded("session id too long"));
    }
    Ok(())
}

pub(crate) fn validate_group(group: &str) -> Result<(), EngineError> {
    if group.len() > MAX_GROUP_KEY_LEN {
        return Err(EngineError::LimitExceeded("group key too long"));
    }
    Ok(())
}
