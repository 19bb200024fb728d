//! Error responses.
//!
//! Maps each [`OnchainError`] to its HTTP status and a JSON body of the
//! form `{"error": ..., "details": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::onchain::OnchainError;

impl OnchainError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OnchainError::NotFound(_) => StatusCode::NOT_FOUND,
            OnchainError::Unauthorized => StatusCode::UNAUTHORIZED,
            OnchainError::Validation(_) => StatusCode::BAD_REQUEST,
            OnchainError::UpstreamUnavailable { .. } | OnchainError::UpstreamRejected { .. } => {
                StatusCode::BAD_GATEWAY
            }
            OnchainError::PersistenceFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OnchainError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.to_string();
        let body = match self {
            OnchainError::UpstreamUnavailable { cause } => json!({
                "error": error,
                "details": cause,
            }),
            OnchainError::UpstreamRejected { status_code, body } => json!({
                "error": error,
                "details": format!("chain-service responded with status {}", status_code),
                "upstream_status": status_code,
                "body": body,
            }),
            OnchainError::PersistenceFailure { details, .. } => json!({
                "error": error,
                "details": details,
            }),
            _ => json!({ "error": error }),
        };
        (status, Json(body)).into_response()
    }
}
