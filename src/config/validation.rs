//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the chain service URL and value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BridgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::BridgeConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("chain_service.base_url '{url}' is invalid: {reason}")]
    InvalidChainUrl { url: String, reason: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("chain_service.read_timeout_secs ({read}) exceeds timeouts.request_secs ({request})")]
    ReadTimeoutExceedsRequest { read: u64, request: u64 },

    #[error("database.path must not be empty")]
    EmptyDatabasePath,

    #[error("listener.bind_address must not be empty")]
    EmptyBindAddress,
}

/// Validate a parsed configuration, collecting every error.
pub fn validate_config(config: &BridgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.chain_service.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidChainUrl {
            url: config.chain_service.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidChainUrl {
            url: config.chain_service.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.chain_service.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("chain_service.connect_timeout_secs"));
    }
    if config.chain_service.read_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("chain_service.read_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.chain_service.read_timeout_secs > config.timeouts.request_secs {
        errors.push(ValidationError::ReadTimeoutExceedsRequest {
            read: config.chain_service.read_timeout_secs,
            request: config.timeouts.request_secs,
        });
    }

    if config.database.path.trim().is_empty() {
        errors.push(ValidationError::EmptyDatabasePath);
    }
    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
