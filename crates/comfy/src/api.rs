//! HTTP wrapper for the engine's REST endpoints.
//!
//! Covers the liveness probe (`GET /system_stats`) and workflow
//! submission (`POST /prompt`). Artifact upload and retrieval live in
//! [`crate::transfer`].

use serde::Deserialize;

use infravision_core::error::GenerationError;

/// HTTP client for a single engine.
pub struct EngineApi {
    client: reqwest::Client,
    api_url: String,
}

/// Response returned by `POST /prompt` after queuing a workflow.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the queued prompt.
    pub prompt_id: String,
}

impl EngineApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. `http://127.0.0.1:8188`.
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Base HTTP API URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Probe the engine before starting any work.
    ///
    /// A failed probe fails the whole attempt fast: nothing is uploaded
    /// or submitted against an unreachable engine.
    pub async fn preflight(&self) -> Result<(), GenerationError> {
        self.client
            .get(format!("{}/system_stats", self.api_url))
            .send()
            .await
            .map_err(|e| {
                GenerationError::ConnectionUnavailable(format!(
                    "engine at {} did not answer: {e}",
                    self.api_url
                ))
            })?;
        Ok(())
    }

    /// Submit a workflow graph for execution.
    ///
    /// Carries the event-channel `session_id` so completion messages are
    /// routed to the already-open subscription.
    pub async fn submit_workflow(
        &self,
        workflow: &serde_json::Value,
        session_id: &str,
    ) -> Result<SubmitResponse, GenerationError> {
        let body = serde_json::json!({
            "client_id": session_id,
            "prompt": workflow,
        });

        let response = self
            .client
            .post(format!("{}/prompt", self.api_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::SubmissionRejected {
                status: 0,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenerationError::SubmissionRejected {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<SubmitResponse>()
            .await
            .map_err(|e| GenerationError::SubmissionRejected {
                status: status.as_u16(),
                detail: format!("unparseable submission response: {e}"),
            })
    }
}
