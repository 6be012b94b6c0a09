use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::{FetchError, MachineServiceClient, Upstream};
use crate::domain::machine_feed::FeedItem;
use crate::infrastructure::config::UpstreamConfig;

/// Upper bound for a single backoff sleep
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct MachineNameResponse {
    #[serde(default)]
    name: String,
}

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(MAX_BACKOFF)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// reqwest-backed client for the repairs, sessions and machine-name services.
///
/// Every call is `GET <base-url>?machine_id=<id>`.
pub struct HttpMachineServiceClient {
    repairs_url: String,
    sessions_url: String,
    machine_name_url: String,
    retry: RetryPolicy,
    http_client: reqwest::Client,
}

impl HttpMachineServiceClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            repairs_url: config.repairs_url.clone(),
            sessions_url: config.sessions_url.clone(),
            machine_name_url: config.machine_name_url.clone(),
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay: config.retry_base_delay,
            },
            http_client,
        })
    }

    fn url_for(&self, upstream: Upstream) -> &str {
        match upstream {
            Upstream::Repairs => &self.repairs_url,
            Upstream::Sessions => &self.sessions_url,
            Upstream::MachineName => &self.machine_name_url,
        }
    }

    /// Fetch and decode one upstream document, retrying transient failures
    async fn get_json<T: DeserializeOwned>(
        &self,
        upstream: Upstream,
        machine_id: &str,
    ) -> Result<T, FetchError> {
        let max_attempts = self.retry.attempts();
        let mut attempt = 1;

        loop {
            let err = match self.try_get(upstream, machine_id).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if attempt >= max_attempts || !err.is_retryable() {
                tracing::error!(
                    upstream = %upstream,
                    machine_id,
                    attempt,
                    error = %err,
                    "Upstream fetch failed"
                );
                return Err(err);
            }

            let delay = self.retry.backoff(attempt);
            tracing::warn!(
                upstream = %upstream,
                machine_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Upstream fetch attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Single attempt: send, require 200, read and decode the body
    async fn try_get<T: DeserializeOwned>(
        &self,
        upstream: Upstream,
        machine_id: &str,
    ) -> Result<T, FetchError> {
        let transport = |source| FetchError::Transport { upstream, source };

        let response = self
            .http_client
            .get(self.url_for(upstream))
            .query(&[("machine_id", machine_id)])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::status(upstream, status));
        }

        let body = response.bytes().await.map_err(transport)?;

        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { upstream, source })
    }
}

#[async_trait]
impl MachineServiceClient for HttpMachineServiceClient {
    async fn fetch_repairs(&self, machine_id: &str) -> Result<Vec<FeedItem>, FetchError> {
        self.get_json(Upstream::Repairs, machine_id).await
    }

    async fn fetch_sessions(&self, machine_id: &str) -> Result<Vec<FeedItem>, FetchError> {
        self.get_json(Upstream::Sessions, machine_id).await
    }

    async fn fetch_machine_name(&self, machine_id: &str) -> Result<String, FetchError> {
        let response: MachineNameResponse = self.get_json(Upstream::MachineName, machine_id).await?;
        Ok(response.name)
    }
}
