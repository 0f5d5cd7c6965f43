//! Claude Messages API integration.

pub mod api;
pub mod client;

pub use api::{ContentBlock, MessagesRequest, MessagesResponse, RequestMessage, Usage};
pub use client::ClaudeClient;

/// Error types for Claude API calls.
#[derive(Debug, thiserror::Error)]
pub enum ClaudeError {
    #[error("Claude request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Claude API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Claude returned no text content")]
    EmptyResponse,
}
