//! Caller-facing error taxonomy for submissions and callbacks.

use thiserror::Error;

use crate::chain::ChainError;
use crate::ledger::StoreError;

/// Every way a submission or callback can fail. Nothing is retried
/// automatically; each variant maps to one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnchainError {
    /// Unknown emission, or no ledger record to update.
    #[error("{0}")]
    NotFound(String),

    /// Missing or wrong webhook secret, or none configured.
    #[error("unauthorized")]
    Unauthorized,

    /// Malformed callback body or unrecognized status.
    #[error("{0}")]
    Validation(String),

    /// Network failure or timeout reaching the chain service.
    #[error("chain-service unreachable")]
    UpstreamUnavailable { cause: String },

    /// Non-2xx answer from the chain service.
    #[error("chain-service HTTP error")]
    UpstreamRejected { status_code: u16, body: String },

    /// Local store read or write failed.
    #[error("{context}")]
    PersistenceFailure { context: &'static str, details: String },
}

impl OnchainError {
    pub(crate) fn persistence(context: &'static str, err: StoreError) -> Self {
        OnchainError::PersistenceFailure {
            context,
            details: err.to_string(),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OnchainError::NotFound(_) => "not_found",
            OnchainError::Unauthorized => "unauthorized",
            OnchainError::Validation(_) => "validation",
            OnchainError::UpstreamUnavailable { .. } => "upstream_unavailable",
            OnchainError::UpstreamRejected { .. } => "upstream_rejected",
            OnchainError::PersistenceFailure { .. } => "persistence_failure",
        }
    }
}

impl From<ChainError> for OnchainError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Rejected { status_code, body } => {
                OnchainError::UpstreamRejected { status_code, body }
            }
            ChainError::Unavailable { cause } => OnchainError::UpstreamUnavailable { cause },
        }
    }
}
