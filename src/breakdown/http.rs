//! Remote breakdown service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{validate_subtasks, BreakdownError, BreakdownGateway, BreakdownRequest, BreakdownResponse};

const BREAKDOWN_PATH: &str = "/api/tasks/breakdown";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Calls `POST {base_url}/api/tasks/breakdown` once per breakdown. No retries.
pub struct HttpBreakdownGateway {
    client: Client,
    endpoint: String,
}

impl HttpBreakdownGateway {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BreakdownError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests fail with `Timeout` after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BreakdownError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BreakdownError::network(format!("Failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into();
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), BREAKDOWN_PATH),
        })
    }
}

#[async_trait]
impl BreakdownGateway for HttpBreakdownGateway {
    async fn breakdown(&self, title: &str) -> Result<Vec<String>, BreakdownError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BreakdownError::invalid_input("Task title cannot be empty"));
        }

        let request = BreakdownRequest {
            task: title.to_string(),
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(BreakdownError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            // Body is ignored on failure
            return Err(BreakdownError::status(
                status.as_u16(),
                status
                    .canonical_reason()
                    .unwrap_or("non-success status")
                    .to_string(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(BreakdownError::from_transport)?;
        let parsed: BreakdownResponse = serde_json::from_str(&body).map_err(|e| {
            BreakdownError::malformed(format!("Failed to parse response: {}", e))
        })?;

        let subtasks = validate_subtasks(parsed.subtasks)?;
        tracing::debug!(
            endpoint = %self.endpoint,
            count = subtasks.len(),
            "Remote breakdown succeeded"
        );
        Ok(subtasks)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
