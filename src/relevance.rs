use crate::config::Config;
use crate::relevance_types::{AgentMessage, AgentOutput, PollStatus, TriggerPayload, TriggerResponse};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, trace, warn};

#[derive(Debug, thiserror::Error)]
pub enum RelevanceError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("an error occurred while polling: {0}")]
    Request(#[from] reqwest::Error),
    #[error("max polling attempts ({0}) reached without success")]
    Exhausted(u32),
    #[error("agent returned an empty output")]
    EmptyOutput,
}

/// Client for the relevance.ai agent trigger and async job endpoints.
#[derive(Clone)]
pub struct RelevanceClient {
    http_client: reqwest::Client,
    base_url: String,
    authorization_token: String,
    max_poll_attempts: u32,
    poll_delay: Duration,
}

impl RelevanceClient {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        authorization_token: impl Into<String>,
        max_poll_attempts: u32,
        poll_delay: Duration,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            authorization_token: authorization_token.into(),
            max_poll_attempts,
            poll_delay,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, RelevanceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.relevance_timeout)
            .build()?;
        Ok(Self::new(
            http_client,
            config.relevance_base_url(),
            config.relevance_authorization_token.clone(),
            config.max_poll_attempts,
            config.poll_delay,
        ))
    }

    /// Start an agent job for `user_content`, continuing `conversation_id` when one is active.
    pub async fn trigger_agent(
        &self,
        agent_id: &str,
        user_content: &str,
        conversation_id: Option<&str>,
    ) -> Result<TriggerResponse, RelevanceError> {
        let url = format!("{}/agents/trigger", self.base_url);
        let payload = TriggerPayload {
            message: AgentMessage {
                role: "user".to_string(),
                content: user_content.to_string(),
            },
            agent_id: agent_id.to_string(),
            conversation_id: conversation_id.map(str::to_string),
        };
        debug!(payload=?payload, "triggering relevance agent");
        let resp = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, &self.authorization_token)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                error!(error=%e, "failed to send trigger request to relevance");
                e
            })?;
        let resp = resp.json::<TriggerResponse>().await.map_err(|e| {
            error!(error=%e, "failed to deserialize relevance trigger response");
            e
        })?;
        debug!(response=?resp, "relevance trigger agent response");

        Ok(resp)
    }

    /// Poll a job until it completes with a `chain-success` update, the attempts run out, or a
    /// request fails.  A failed request ends polling immediately.
    pub async fn poll_for_updates(
        &self,
        studio_id: &str,
        job_id: &str,
    ) -> Result<AgentOutput, PollError> {
        let url = format!(
            "{}/studios/{studio_id}/async_poll/{job_id}",
            self.base_url
        );
        for attempt in 0..self.max_poll_attempts {
            let status = self.poll_once(&url).await.map_err(|e| {
                error!(error=%e, attempt, "an error occurred while polling");
                PollError::Request(e)
            })?;
            trace!(attempt, kind=%status.kind, "polled relevance job");
            if status.is_complete() {
                if let Some(output) = status.chain_success() {
                    debug!(attempt, "relevance job complete");
                    return Ok(output);
                }
            }
            sleep(self.poll_delay).await;
        }

        warn!(studio_id, job_id, "max polling attempts reached without success");
        Err(PollError::Exhausted(self.max_poll_attempts))
    }

    async fn poll_once(&self, url: &str) -> Result<PollStatus, reqwest::Error> {
        self.http_client
            .get(url)
            .header(AUTHORIZATION, &self.authorization_token)
            .send()
            .await?
            .error_for_status()?
            .json::<PollStatus>()
            .await
    }
}
