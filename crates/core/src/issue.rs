//! Sentry issue and event payloads.
//!
//! Typed views over the subset of the Sentry API we consume. Unknown fields
//! are ignored; entry payloads other than `"exception"` are kept as raw JSON
//! and never deserialized.

use serde::Deserialize;

/// A deduplicated group of error occurrences, as returned by the issues API.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    /// Numeric issue ID.
    pub id: String,
    /// Short ID (e.g., "WEB-123").
    #[serde(rename = "shortId")]
    pub short_id: String,
    /// Issue title (error message).
    pub title: String,
    /// Web URL to view the issue.
    #[serde(default)]
    pub permalink: String,
    /// Issue status ("unresolved", "resolved", "ignored").
    pub status: String,
    /// First seen timestamp (ISO-8601, kept verbatim).
    #[serde(rename = "firstSeen")]
    pub first_seen: String,
    /// Last seen timestamp (ISO-8601, kept verbatim).
    #[serde(rename = "lastSeen")]
    pub last_seen: String,
    /// Occurrence count. Sentry serializes this as a string.
    #[serde(default)]
    pub count: String,
    /// Number of distinct users affected.
    #[serde(rename = "userCount", default)]
    pub user_count: u64,
    /// Error metadata (type/value/filename).
    #[serde(default)]
    pub metadata: IssueMetadata,
}

/// Free-form error metadata attached to an issue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueMetadata {
    /// Exception class name (e.g., "TypeError").
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    /// Exception message.
    pub value: Option<String>,
    /// File the error was attributed to.
    pub filename: Option<String>,
}

/// One concrete occurrence of an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event ID.
    #[serde(rename = "eventID", default)]
    pub id: Option<String>,
    /// Platform of the SDK that sent the event ("javascript", "python", ...).
    #[serde(default)]
    pub platform: Option<String>,
    /// Typed entry list. Only the "exception" entry is consumed.
    #[serde(default)]
    pub entries: Vec<EventEntry>,
    /// Key/value tags.
    #[serde(default)]
    pub tags: Vec<EventTag>,
    /// User info, kept raw.
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// One entry in an event. The payload stays raw JSON so entry kinds we do
/// not understand can never fail deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventTag {
    pub key: String,
    pub value: String,
}

/// One element of an exception entry's `values` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionValue {
    /// Exception class name.
    #[serde(rename = "type")]
    pub exception_type: Option<String>,
    /// Exception message.
    pub value: Option<String>,
    /// Stack trace, outermost call first.
    pub stacktrace: Option<RawStacktrace>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStacktrace {
    #[serde(default)]
    pub frames: Vec<StackFrame>,
}

/// One call-stack entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackFrame {
    /// Path relative to the application root, when known.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(rename = "lineNo", default)]
    pub line_no: Option<u64>,
    #[serde(rename = "colNo", default)]
    pub col_no: Option<u64>,
    /// Absolute path on the host that recorded the event.
    #[serde(rename = "absPath", default)]
    pub abs_path: Option<String>,
    /// Source context as (line number, code) pairs.
    #[serde(default)]
    pub context: Vec<(u64, String)>,
    /// Local variable snapshot, kept raw.
    #[serde(default)]
    pub vars: Option<serde_json::Value>,
    /// Whether the frame is attributed to application code.
    #[serde(rename = "inApp", default)]
    pub in_app: bool,
}

/// Ordered stack frames, outermost call first as received. Consumers that
/// present traces reverse this to innermost-first.
#[derive(Debug, Clone, Default)]
pub struct StackTrace {
    pub frames: Vec<StackFrame>,
}

impl Event {
    /// Typed view of the exception entry's `values` list.
    ///
    /// Returns an empty list when there is no exception entry or its payload
    /// does not parse; the affected-file fallback scan still sees the raw
    /// entries in that case.
    pub fn exception_values(&self) -> Vec<ExceptionValue> {
        let Some(entry) = self.entries.iter().find(|e| e.kind == "exception") else {
            return Vec::new();
        };

        entry.data["values"]
            .as_array()
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Raw exception entries, for consumers that scan frames without the
    /// typed translation.
    pub fn raw_exception_entries(&self) -> impl Iterator<Item = &serde_json::Value> {
        self.entries
            .iter()
            .filter(|e| e.kind == "exception")
            .map(|e| &e.data)
    }
}
