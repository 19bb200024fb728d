//! Route handlers for the on-chain endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::http::server::AppState;
use crate::ledger::{OnChainLedgerRecord, StoreError};
use crate::onchain::{OnchainError, CHAIN_SECRET_HEADER};
use crate::storage;

/// `POST /onchain/emissions/{emission_id}`
pub async fn submit_emission(
    State(state): State<AppState>,
    Path(emission_id): Path<i64>,
) -> Result<impl IntoResponse, OnchainError> {
    let accepted = state.orchestrator.submit(emission_id).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "ok": true,
            "emission_id": accepted.emission_id,
            "chain_response": accepted.chain_response,
        })),
    ))
}

/// `GET /onchain/emissions/{emission_id}`
pub async fn get_onchain_status(
    State(state): State<AppState>,
    Path(emission_id): Path<i64>,
) -> Result<Json<OnChainLedgerRecord>, OnchainError> {
    let ledger = state.ledger.clone();
    match storage::run_blocking(move || ledger.get_status(emission_id)).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(OnchainError::NotFound("no onchain record".to_string())),
        Err(e) => Err(OnchainError::persistence("failed to read onchain record", e)),
    }
}

/// `PUT /onchain/callback`
///
/// The body is taken raw so authentication runs before any parsing and a
/// missing content type is tolerated. The receiver touches the database, so
/// it runs on the blocking pool.
pub async fn onchain_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, OnchainError> {
    let secret = headers
        .get(CHAIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let callbacks = state.callbacks.clone();
    let receipt = tokio::task::spawn_blocking(move || {
        callbacks.handle_callback(secret.as_deref(), &body)
    })
    .await
    .map_err(|e| OnchainError::persistence("db update failed", StoreError::from(e)))??;
    Ok(Json(json!({
        "ok": true,
        "emission_id": receipt.emission_id,
        "tx_hash": receipt.tx_hash,
        "status": receipt.status,
    })))
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}
