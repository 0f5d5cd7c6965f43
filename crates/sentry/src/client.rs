//! Sentry API client for fetching issues and posting comments.

use serde::de::DeserializeOwned;
use tracing::debug;

use autofix_core::{Event, Issue};

use crate::SentryError;

/// Sentry API client.
///
/// Carries no retry or timeout policy of its own; callers that need either
/// wrap the individual calls.
pub struct SentryClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: String,
    organization: String,
}

impl SentryClient {
    pub fn new(organization: &str, auth_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://sentry.io/api/0".to_string(),
            auth_token: auth_token.to_string(),
            organization: organization.to_string(),
        }
    }

    /// List issues for a project, newest first.
    pub async fn list_issues(
        &self,
        project: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Issue>, SentryError> {
        self.get(&format!(
            "/projects/{}/{}/issues/?query={}&limit={}",
            self.organization,
            project,
            urlencoding::encode(query),
            limit
        ))
        .await
    }

    /// Get one issue by ID (numeric or short ID like "WEB-123").
    pub async fn get_issue(&self, issue_id: &str) -> Result<Issue, SentryError> {
        self.get(&format!(
            "/organizations/{}/issues/{}/",
            self.organization, issue_id
        ))
        .await
    }

    /// Get the latest event for an issue. Returns `None` when the issue has
    /// no recorded events (the API answers 404).
    pub async fn latest_event(&self, issue_id: &str) -> Result<Option<Event>, SentryError> {
        let url = format!("{}/issues/{}/events/latest/", self.base_url, issue_id);
        debug!(url = %url, "Sentry API request");

        let resp = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SentryError::Api { status, body });
        }

        Ok(Some(resp.json().await?))
    }

    /// Post a comment (a "note") on an issue.
    pub async fn post_comment(&self, issue_id: &str, body: &str) -> Result<(), SentryError> {
        let url = format!("{}/issues/{}/comments/", self.base_url, issue_id);
        debug!(url = %url, "Sentry API request");

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .json(&serde_json::json!({ "text": body }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SentryError::Api { status, body });
        }

        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, SentryError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, "Sentry API request");

        let resp = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Content-Type", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SentryError::Api { status, body });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_encoded() {
        let encoded = urlencoding::encode("is:unresolved level:error");
        assert_eq!(encoded, "is%3Aunresolved%20level%3Aerror");
    }

    #[test]
    fn test_client_construction() {
        let client = SentryClient::new("acme", "token");
        assert_eq!(client.organization, "acme");
        assert_eq!(client.base_url, "https://sentry.io/api/0");
    }
}
