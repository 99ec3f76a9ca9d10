use crate::model::Ms;

// ── Identifiers ──────────────────────────────────────────────────

pub const MAX_LOCATION_KEY_LEN: usize = 256;
pub const MAX_SESSION_ID_LEN: usize = 256;
pub const MAX_GROUP_KEY_LEN: usize = 256;
pub const MAX_TENANT_NAME_LEN: usize = 256;

// ── Time ─────────────────────────────────────────────────────────

/// 1970-01-01T00:00:00Z
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;
/// 9999-12-31T23:59:59.999Z
pub const MAX_VALID_TIMESTAMP_MS: Ms = 253_402_300_799_999;
/// A single session never runs longer than a week; multi-day runs are split upstream.
pub const MAX_SPAN_DURATION_MS: Ms = 7 * 24 * 3_600_000;

// ── Capacity & volume ────────────────────────────────────────────

pub const MAX_CAPACITY: u32 = 1024;
pub const MAX_ASSIGNMENTS_PER_LOCATION: usize = 100_000;
pub const MAX_LOCATIONS_PER_TENANT: usize = 10_000;
pub const MAX_TENANTS: usize = 1024;
pub const MAX_BATCH_SIZE: usize = 10_000;
pub const MAX_PLAN_OPS: usize = 100_000;
