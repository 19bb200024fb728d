//! HTTP client for the external chain service.
//!
//! # Responsibilities
//! - Send one submission to `POST {base_url}/send`
//! - Fail fast on connect, allow a longer read while the service broadcasts
//! - Map transport and HTTP failures to [`ChainError`]
//!
//! No retries happen here; resubmission is the caller's decision.

use std::time::{Duration, Instant};

use crate::chain::payload::ChainPayload;
use crate::chain::types::{ChainError, ChainResponse, ChainResult, SendRequest};
use crate::config::ChainServiceConfig;
use crate::observability::metrics;

/// Stateless chain service client.
#[derive(Debug, Clone)]
pub struct ChainClient {
    http: reqwest::Client,
    send_url: String,
}

impl ChainClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Fails only if the underlying HTTP client cannot be constructed.
    pub fn new(config: &ChainServiceConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .build()?;

        let send_url = format!("{}/send", config.base_url.trim_end_matches('/'));

        tracing::info!(
            send_url = %send_url,
            connect_timeout_secs = config.connect_timeout_secs,
            read_timeout_secs = config.read_timeout_secs,
            "Chain client initialized"
        );

        Ok(Self { http, send_url })
    }

    /// Full URL submissions are posted to.
    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    /// Submit one emission payload.
    pub async fn send(&self, emission_id: i64, payload: &ChainPayload) -> ChainResult<ChainResponse> {
        let start = Instant::now();
        let result = self.send_inner(emission_id, payload).await;
        metrics::record_chain_call(outcome_label(&result), start);
        result
    }

    async fn send_inner(&self, emission_id: i64, payload: &ChainPayload) -> ChainResult<ChainResponse> {
        let response = self
            .http
            .post(&self.send_url)
            .json(&SendRequest { emission_id, payload })
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                emission_id,
                status = status.as_u16(),
                "Chain service rejected submission"
            );
            return Err(ChainError::Rejected {
                status_code: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(unavailable)?;
        serde_json::from_slice(&bytes).map_err(|e| ChainError::Unavailable {
            cause: format!("malformed chain-service response: {}", e),
        })
    }
}

fn unavailable(err: reqwest::Error) -> ChainError {
    let cause = if err.is_timeout() {
        format!("timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    tracing::warn!(error = %cause, "Chain service unreachable");
    ChainError::Unavailable { cause }
}

fn outcome_label(result: &ChainResult<ChainResponse>) -> &'static str {
    match result {
        Ok(_) => "accepted",
        Err(ChainError::Rejected { .. }) => "rejected",
        Err(ChainError::Unavailable { .. }) => "unavailable",
    }
}
