//! Claude API client.

use tracing::{debug, info};

use crate::api::{MessagesRequest, MessagesResponse, RequestMessage};
use crate::ClaudeError;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude Messages API client. One prompt in, one capped non-streaming
/// completion out; no retry or timeout policy of its own.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str, max_tokens: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
        }
    }

    /// Send a single-prompt completion request and return the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, ClaudeError> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![RequestMessage::user(prompt)],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Claude API request");

        let resp = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClaudeError::Api { status, body });
        }

        let parsed: MessagesResponse = resp.json().await?;

        if let Some(usage) = &parsed.usage {
            info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                stop_reason = parsed.stop_reason.as_deref().unwrap_or("-"),
                "Claude completed"
            );
        }

        parsed.text().ok_or(ClaudeError::EmptyResponse)
    }
}
