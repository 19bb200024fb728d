//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the database and prepare the ledger table
//! - Build the chain client, orchestrator and callback receiver from one
//!   immutable configuration value
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;

use thiserror::Error;

use crate::chain::ChainClient;
use crate::config::BridgeConfig;
use crate::emissions::{EmissionSource, SqliteEmissionSource};
use crate::http::AppState;
use crate::ledger::{LedgerStore, SqliteLedgerStore, StoreError};
use crate::onchain::{CallbackReceiver, SubmissionOrchestrator};
use crate::storage;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open database '{path}': {source}")]
    Database { path: String, source: StoreError },

    #[error("failed to build chain service client: {0}")]
    ChainClient(#[from] reqwest::Error),
}

/// Open the configured database and wire every component.
pub fn build_state(config: &BridgeConfig) -> Result<AppState, StartupError> {
    let database_error = |source| StartupError::Database {
        path: config.database.path.clone(),
        source,
    };

    let conn = storage::open(&config.database.path).map_err(database_error)?;
    let ledger = Arc::new(SqliteLedgerStore::new(conn.clone()).map_err(database_error)?);
    let emissions = Arc::new(SqliteEmissionSource::new(conn));

    tracing::info!(path = %config.database.path, "Ledger store ready");
    assemble(config, emissions, ledger)
}

/// Wire components over caller-provided stores.
pub fn assemble(
    config: &BridgeConfig,
    emissions: Arc<dyn EmissionSource>,
    ledger: Arc<dyn LedgerStore>,
) -> Result<AppState, StartupError> {
    let client = ChainClient::new(&config.chain_service)?;

    if config.webhook.secret.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("No webhook secret configured; every chain callback will be rejected");
    }

    Ok(AppState {
        orchestrator: SubmissionOrchestrator::new(emissions, ledger.clone(), client),
        callbacks: CallbackReceiver::new(ledger.clone(), &config.webhook),
        ledger,
    })
}
