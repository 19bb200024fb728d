//! Chain service wire types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::chain::payload::ChainPayload;

/// Body of `POST {base_url}/send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendRequest<'a> {
    pub emission_id: i64,
    pub payload: &'a ChainPayload,
}

/// Immediate answer of the chain service to a submission.
///
/// The transaction hash normally arrives later through the callback, so
/// every field is optional; unknown fields are kept and echoed back.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,

    #[serde(rename = "txHash", default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Errors that can occur while talking to the chain service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The chain service answered with a non-2xx status.
    #[error("chain-service HTTP error {status_code}")]
    Rejected { status_code: u16, body: String },

    /// Connection, timeout, or an unreadable response.
    #[error("chain-service unreachable: {cause}")]
    Unavailable { cause: String },
}

/// Result type for chain service calls.
pub type ChainResult<T> = Result<T, ChainError>;
