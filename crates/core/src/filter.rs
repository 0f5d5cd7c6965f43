//! Auto-fix eligibility filter.

use crate::context::IssueContext;

/// Issues seen more than this many times are considered too hot to auto-fix;
/// they are usually systemic and need a human. Boundary is inclusive.
pub const MAX_EVENT_COUNT: u64 = 10_000;

/// Decide whether an issue is worth sending to the model. Pure and
/// deterministic; all conditions must hold:
///
/// - a non-empty stack trace was extracted,
/// - at least one frame is in application code,
/// - the occurrence count parses and is at most [`MAX_EVENT_COUNT`].
///
/// An unparsable count is treated as ineligible.
pub fn is_eligible(ctx: &IssueContext) -> bool {
    let Some(trace) = &ctx.stacktrace else {
        return false;
    };
    if trace.frames.is_empty() {
        return false;
    }
    if !trace.frames.iter().any(|f| f.in_app) {
        return false;
    }

    match ctx.issue.count.trim().parse::<u64>() {
        Ok(count) => count <= MAX_EVENT_COUNT,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{Event, Issue};

    fn make_context(count: &str, frames: serde_json::Value) -> IssueContext {
        let issue: Issue = serde_json::from_value(serde_json::json!({
            "id": "1",
            "shortId": "WEB-1",
            "title": "Error",
            "status": "unresolved",
            "firstSeen": "2025-01-01T00:00:00Z",
            "lastSeen": "2025-01-01T00:00:00Z",
            "count": count
        }))
        .unwrap();

        let event: Event = serde_json::from_value(serde_json::json!({
            "entries": [{"type": "exception", "data": {"values": [{
                "type": "Error",
                "stacktrace": {"frames": frames}
            }]}}]
        }))
        .unwrap();

        IssueContext::build(issue, Some(event)).unwrap()
    }

    #[test]
    fn test_eligible() {
        let ctx = make_context("42", serde_json::json!([
            {"filename": "vendor/lib.js", "inApp": false},
            {"filename": "src/a.ts", "inApp": true}
        ]));
        assert!(is_eligible(&ctx));
    }

    #[test]
    fn test_no_stacktrace() {
        let issue: Issue = serde_json::from_value(serde_json::json!({
            "id": "1",
            "shortId": "WEB-1",
            "title": "Error",
            "status": "unresolved",
            "firstSeen": "2025-01-01T00:00:00Z",
            "lastSeen": "2025-01-01T00:00:00Z",
            "count": "1"
        }))
        .unwrap();
        let event: Event = serde_json::from_value(serde_json::json!({"entries": []})).unwrap();
        let ctx = IssueContext::build(issue, Some(event)).unwrap();
        assert!(!is_eligible(&ctx));
    }

    #[test]
    fn test_empty_frames() {
        let ctx = make_context("1", serde_json::json!([]));
        assert!(!is_eligible(&ctx));
    }

    #[test]
    fn test_no_in_app_frames() {
        let ctx = make_context("1", serde_json::json!([
            {"filename": "vendor/lib.js", "inApp": false},
            {"filename": "vendor/other.js", "inApp": false}
        ]));
        assert!(!is_eligible(&ctx));
    }

    #[test]
    fn test_count_boundary_inclusive() {
        let frames = serde_json::json!([{"filename": "src/a.ts", "inApp": true}]);
        assert!(is_eligible(&make_context("10000", frames.clone())));
        assert!(!is_eligible(&make_context("10001", frames)));
    }

    #[test]
    fn test_unparsable_count_is_ineligible() {
        let frames = serde_json::json!([{"filename": "src/a.ts", "inApp": true}]);
        assert!(!is_eligible(&make_context(">1k", frames.clone())));
        assert!(!is_eligible(&make_context("", frames)));
    }
}
