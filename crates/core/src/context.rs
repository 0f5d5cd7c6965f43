//! Issue context extraction.
//!
//! Normalizes a raw issue + event pair into the analysis context the rest of
//! the pipeline consumes: the main exception's stack trace, the set of
//! affected files, and the error type/message.

use tracing::debug;

use crate::issue::{Event, Issue, StackTrace};
use crate::Error;

/// Normalized analysis context for one issue. Built once per issue per run,
/// read-only afterward.
#[derive(Debug, Clone)]
pub struct IssueContext {
    pub issue: Issue,
    pub event: Event,
    /// Stack trace of the main exception, outermost call first. Absent when
    /// the event carries no parseable exception entry.
    pub stacktrace: Option<StackTrace>,
    /// Affected file paths in first-seen order, deduplicated.
    pub affected_files: Vec<String>,
    pub error_type: String,
    pub error_message: String,
}

impl IssueContext {
    /// Build the context from an issue and its latest event.
    ///
    /// Fails only when the issue has no recorded event at all. A missing or
    /// malformed exception entry leaves `stacktrace` absent instead.
    pub fn build(issue: Issue, event: Option<Event>) -> Result<Self, Error> {
        let Some(event) = event else {
            return Err(Error::NoEventData(issue.short_id.clone()));
        };

        let values = event.exception_values();
        // Last element: the most specific exception in a chained-exception
        // scenario.
        let main_exception = values.last();

        let stacktrace = main_exception
            .and_then(|exc| exc.stacktrace.as_ref())
            .map(|st| StackTrace {
                frames: st.frames.clone(),
            });

        let affected_files = collect_affected_files(stacktrace.as_ref(), &event);

        let mut error_type = issue
            .metadata
            .error_type
            .clone()
            .unwrap_or_else(|| issue.title.clone());
        let mut error_message = issue.metadata.value.clone().unwrap_or_default();

        // The event-level detail wins over issue metadata when present.
        if let Some(exc) = main_exception {
            if let Some(t) = &exc.exception_type {
                error_type = t.clone();
            }
            if let Some(v) = &exc.value {
                error_message = v.clone();
            }
        }

        debug!(
            issue = %issue.short_id,
            frames = stacktrace.as_ref().map(|t| t.frames.len()).unwrap_or(0),
            files = affected_files.len(),
            "Extracted issue context"
        );

        Ok(Self {
            issue,
            event,
            stacktrace,
            affected_files,
            error_type,
            error_message,
        })
    }
}

/// Derive the affected-file set: the extracted trace first, then every raw
/// exception entry as a fallback source. The fallback covers events whose
/// exception payload did not survive the typed translation but still carries
/// frame data.
fn collect_affected_files(stacktrace: Option<&StackTrace>, event: &Event) -> Vec<String> {
    let mut files = Vec::new();

    if let Some(trace) = stacktrace {
        for frame in &trace.frames {
            push_frame_file(&mut files, frame.in_app, frame.filename.as_deref(), frame.abs_path.as_deref());
        }
    }

    for data in event.raw_exception_entries() {
        let Some(values) = data["values"].as_array() else {
            continue;
        };
        for value in values {
            let Some(frames) = value["stacktrace"]["frames"].as_array() else {
                continue;
            };
            for frame in frames {
                push_frame_file(
                    &mut files,
                    frame["inApp"].as_bool().unwrap_or(false),
                    frame["filename"].as_str(),
                    frame["absPath"].as_str(),
                );
            }
        }
    }

    files
}

/// Per-frame preference: in-app filename > absolute path > filename.
fn push_frame_file(
    files: &mut Vec<String>,
    in_app: bool,
    filename: Option<&str>,
    abs_path: Option<&str>,
) {
    let picked = if in_app && filename.is_some() {
        filename
    } else {
        abs_path.or(filename)
    };

    if let Some(path) = picked
        && !path.is_empty()
        && !files.iter().any(|f| f == path)
    {
        files.push(path.to_string());
    }
}
