//! Core types and analysis logic for the Sentry autofix pipeline.

pub mod context;
pub mod filter;
pub mod issue;
pub mod proposal;

pub use context::IssueContext;
pub use filter::{is_eligible, MAX_EVENT_COUNT};
pub use issue::{
    Event, EventEntry, EventTag, ExceptionValue, Issue, IssueMetadata, RawStacktrace, StackFrame,
    StackTrace,
};
pub use proposal::{Confidence, FixProposal, ProposedChange};

/// Error types for the core crate. Context extraction degrades on malformed
/// payloads instead of failing, so a missing event is the only error here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no event data recorded for issue {0}")]
    NoEventData(String),
}
