//! Authenticated status callbacks from the chain service.
//!
//! The secret is checked before the body is even parsed, so an
//! unauthenticated caller learns nothing about validation rules. With no
//! secret configured every callback is refused.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::config::WebhookConfig;
use crate::ledger::types::{MAX_ERROR_MSG_LEN, MAX_TX_HASH_LEN};
use crate::ledger::{CallbackStatus, LedgerStore, Reconciliation};
use crate::observability::metrics;
use crate::onchain::error::OnchainError;

/// Header carrying the shared webhook secret.
pub const CHAIN_SECRET_HEADER: &str = "x-chain-secret";

/// Raw callback body, before validation.
#[derive(Debug, Default, Deserialize)]
struct CallbackBody {
    emission_id: Option<i64>,
    tx_hash: Option<String>,
    status: Option<String>,
    error_msg: Option<String>,
}

/// Confirmation of an applied callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallbackReceipt {
    pub emission_id: Option<i64>,
    pub tx_hash: Option<String>,
    pub status: CallbackStatus,
}

/// Reconciles chain service callbacks against the ledger.
#[derive(Clone)]
pub struct CallbackReceiver {
    ledger: Arc<dyn LedgerStore>,
    secret: Option<String>,
}

impl CallbackReceiver {
    pub fn new(ledger: Arc<dyn LedgerStore>, config: &WebhookConfig) -> Self {
        Self {
            ledger,
            secret: config.secret.clone(),
        }
    }

    /// Authenticate, validate and apply one callback.
    pub fn handle_callback(
        &self,
        secret: Option<&str>,
        body: &[u8],
    ) -> Result<CallbackReceipt, OnchainError> {
        let result = self.apply(secret, body);
        metrics::record_callback(match &result {
            Ok(_) => "applied",
            Err(e) => e.kind(),
        });
        result
    }

    fn apply(&self, secret: Option<&str>, body: &[u8]) -> Result<CallbackReceipt, OnchainError> {
        if !self.authenticate(secret) {
            tracing::warn!(secret_present = secret.is_some(), "Rejected unauthenticated callback");
            return Err(OnchainError::Unauthorized);
        }

        let update = parse_callback(body)?;

        let affected = self.ledger.reconcile(&update).map_err(|e| {
            tracing::error!(error = %e, "Ledger update from callback failed");
            OnchainError::persistence("db update failed", e)
        })?;

        if affected == 0 {
            tracing::warn!(
                emission_id = ?update.emission_id,
                tx_hash = ?update.tx_hash,
                "Callback matched no ledger record"
            );
            return Err(OnchainError::NotFound("onchain record not found".to_string()));
        }

        tracing::info!(
            emission_id = ?update.emission_id,
            tx_hash = ?update.tx_hash,
            status = %update.status,
            "Ledger record reconciled"
        );

        Ok(CallbackReceipt {
            emission_id: update.emission_id,
            tx_hash: update.tx_hash,
            status: update.status,
        })
    }

    fn authenticate(&self, supplied: Option<&str>) -> bool {
        match (self.secret.as_deref(), supplied) {
            (Some(expected), Some(supplied)) if !expected.is_empty() => {
                bool::from(expected.as_bytes().ct_eq(supplied.as_bytes()))
            }
            _ => false,
        }
    }
}

/// Turn a raw body into a validated [`Reconciliation`].
fn parse_callback(body: &[u8]) -> Result<Reconciliation, OnchainError> {
    let body: CallbackBody = serde_json::from_slice(body)
        .map_err(|e| OnchainError::Validation(format!("invalid JSON body: {}", e)))?;

    let status = match body.status.as_deref() {
        None => return Err(OnchainError::Validation("status required".to_string())),
        Some(raw) => raw.parse::<CallbackStatus>().map_err(|_| {
            OnchainError::Validation(format!(
                "status must be one of submitted, confirmed, failed (got '{}')",
                raw
            ))
        })?,
    };

    let tx_hash = body
        .tx_hash
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());

    if body.emission_id.is_none() && tx_hash.is_none() {
        return Err(OnchainError::Validation(
            "emission_id or tx_hash required".to_string(),
        ));
    }

    if let Some(hash) = &tx_hash {
        if hash.chars().count() > MAX_TX_HASH_LEN {
            return Err(OnchainError::Validation(format!(
                "tx_hash longer than {} characters",
                MAX_TX_HASH_LEN
            )));
        }
    }

    let error_msg = body
        .error_msg
        .map(|msg| msg.chars().take(MAX_ERROR_MSG_LEN).collect::<String>());

    Ok(Reconciliation {
        tx_hash,
        emission_id: body.emission_id,
        status,
        error_msg,
    })
}
