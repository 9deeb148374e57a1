//! Orchestrator HTTP Client
//!
//! The worker side of the fetch/submit contract. Transport failures surface as
//! `anyhow` errors; the caller decides when to try again.

use crate::error::ComputeError;
use crate::expression::types::TaskId;
use crate::orchestrator::protocol::{
    ENDPOINT_TASK, FetchTaskResponse, SubmitTaskResultRequest, TaskAssignment,
};

use anyhow::Result;
use reqwest::StatusCode;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const SUBMIT_ATTEMPTS: usize = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(150);
const RETRY_MAX_DELAY: Duration = Duration::from_millis(1200);
const RETRY_JITTER_MS: u64 = 50;

pub struct OrchestratorClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl OrchestratorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Asks for the next task. `Ok(None)` means the queue is empty.
    pub async fn fetch_task(&self) -> Result<Option<TaskAssignment>> {
        let response = self
            .http_client
            .get(format!("{}{}", self.base_url, ENDPOINT_TASK))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch task: {}", response.status()));
        }

        let body: FetchTaskResponse = response.json().await?;
        Ok(body.task)
    }

    /// Reports a computed value or failure for `task_id`.
    ///
    /// A `409 Conflict` means an earlier attempt already landed and is treated as success.
    pub async fn submit_result(
        &self,
        task_id: &TaskId,
        computed: &Result<f64, ComputeError>,
    ) -> Result<()> {
        let payload = SubmitTaskResultRequest::new(task_id.clone(), computed);
        let response = self.send_submission(&payload).await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => {
                tracing::debug!("Task {} result was already recorded", task_id);
                Ok(())
            }
            status => Err(anyhow::anyhow!("Failed to submit result: {}", status)),
        }
    }

    /// Posts a submission, retrying transport errors with doubling, jittered
    /// backoff. Any HTTP response, error statuses included, ends the retries.
    async fn send_submission(
        &self,
        payload: &SubmitTaskResultRequest,
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, ENDPOINT_TASK);
        let mut backoff = RETRY_BASE_DELAY;
        let mut attempt = 1;

        loop {
            let sent = self
                .http_client
                .post(&url)
                .json(payload)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await;

            let error = match sent {
                Ok(response) => return Ok(response),
                Err(e) if attempt >= SUBMIT_ATTEMPTS => {
                    return Err(anyhow::anyhow!(
                        "Submitting task {} failed after {} attempts: {}",
                        payload.id,
                        attempt,
                        e
                    ));
                }
                Err(e) => e,
            };

            let jitter = Duration::from_millis(rand::random::<u64>() % RETRY_JITTER_MS);
            tracing::debug!(
                "Submit attempt {} for task {} failed ({}), retrying in {:?}",
                attempt,
                payload.id,
                error,
                backoff + jitter
            );
            tokio::time::sleep(backoff + jitter).await;

            backoff = (backoff * 2).min(RETRY_MAX_DELAY);
            attempt += 1;
        }
    }
}
