use std::sync::LazyLock;

use regex::Regex;

/// Session ids generated upstream look like `<course>-<group>[-am|-pm][-partN]-<discriminator>`.
/// Capture 1 is the course+group prefix shared by every split part of a run.
static SESSION_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)(?:-(?i:am|pm))?(?:-(?i:part)\d+)?-([^-]+)$")
        .expect("session id pattern is valid")
});

/// Derive the base group of a session id.
///
/// Compatibility shim for externally generated ids; callers that know the
/// group should pass it to `Engine::reserve_in_group` instead. Ids that do not
/// match fall back to their first two hyphen-delimited segments.
pub fn base_group(session_id: &str) -> String {
    if let Some(caps) = SESSION_ID_PATTERN.captures(session_id)
        && let Some(prefix) = caps.get(1)
    {
        return prefix.as_str().to_string();
    }
    session_id.splitn(3, '-').take(2).collect::<Vec<_>>().join("-")
}
