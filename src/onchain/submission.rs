//! Submission of one emission to the chain service.
//!
//! # Sequence
//! ```text
//! fetch emission ──absent──▶ NotFound
//!     → build canonical payload
//!     → upsert ledger row to pending ──error──▶ PersistenceFailure (no network call)
//!     → POST /send ──error──▶ UpstreamRejected | UpstreamUnavailable (row stays pending)
//!     → accepted + immediate chain response
//! ```
//!
//! The pending row is written before the network call so a crash in between
//! leaves recoverable state. A failed call leaves the row at `pending`,
//! which is the signal that resubmitting is safe.

use std::sync::Arc;

use serde::Serialize;

use crate::chain::{ChainClient, ChainPayload, ChainResponse};
use crate::emissions::EmissionSource;
use crate::ledger::LedgerStore;
use crate::observability::metrics;
use crate::onchain::error::OnchainError;
use crate::storage;

/// A submission the chain service accepted for processing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionAccepted {
    pub emission_id: i64,
    pub chain_response: ChainResponse,
}

/// Drives the submit flow against the store and the chain client.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
    emissions: Arc<dyn EmissionSource>,
    ledger: Arc<dyn LedgerStore>,
    client: ChainClient,
}

impl SubmissionOrchestrator {
    pub fn new(
        emissions: Arc<dyn EmissionSource>,
        ledger: Arc<dyn LedgerStore>,
        client: ChainClient,
    ) -> Self {
        Self {
            emissions,
            ledger,
            client,
        }
    }

    /// Submit (or resubmit) one emission.
    pub async fn submit(&self, emission_id: i64) -> Result<SubmissionAccepted, OnchainError> {
        let result = self.run(emission_id).await;
        metrics::record_submission(match &result {
            Ok(_) => "accepted",
            Err(e) => e.kind(),
        });
        result
    }

    async fn run(&self, emission_id: i64) -> Result<SubmissionAccepted, OnchainError> {
        let emissions = Arc::clone(&self.emissions);
        let emission = storage::run_blocking(move || emissions.fetch_emission(emission_id))
            .await
            .map_err(|e| OnchainError::persistence("failed to read emission", e))?
            .ok_or_else(|| OnchainError::NotFound("emission not found".to_string()))?;

        let payload = ChainPayload::from_emission(&emission);

        let ledger = Arc::clone(&self.ledger);
        if let Err(e) = storage::run_blocking(move || ledger.upsert_pending(emission_id)).await {
            tracing::error!(emission_id, error = %e, "Failed to persist pending ledger record");
            return Err(OnchainError::persistence("failed to persist pending job", e));
        }
        tracing::info!(emission_id, "Ledger record pending, submitting to chain service");

        match self.client.send(emission_id, &payload).await {
            Ok(chain_response) => {
                tracing::info!(
                    emission_id,
                    tx_hash = chain_response.tx_hash.as_deref().unwrap_or("-"),
                    "Chain service accepted submission"
                );
                Ok(SubmissionAccepted {
                    emission_id,
                    chain_response,
                })
            }
            Err(e) => {
                tracing::warn!(
                    emission_id,
                    error = %e,
                    "Submission failed, ledger record left pending"
                );
                Err(e.into())
            }
        }
    }
}
