//! Sentry API client for the autofix pipeline.

pub mod client;

pub use client::SentryClient;

/// Error types for Sentry API calls.
#[derive(Debug, thiserror::Error)]
pub enum SentryError {
    #[error("Sentry request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Sentry API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl SentryError {
    /// True when the API rejected the call for missing write scope (403).
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == reqwest::StatusCode::FORBIDDEN)
    }
}
