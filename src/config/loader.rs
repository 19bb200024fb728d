//! Configuration loading from disk and environment.

use std::path::Path;
use std::fs;
use crate::config::schema::BridgeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `chain_service.base_url`.
pub const ENV_CHAIN_SERVICE_URL: &str = "CHAIN_SERVICE_URL";
/// Environment variable overriding `webhook.secret`.
pub const ENV_WEBHOOK_SECRET: &str = "CHAIN_WEBHOOK_SECRET";
/// Environment variable overriding `database.path`.
pub const ENV_DB_PATH: &str = "BRIDGE_DB_PATH";
/// Environment variable overriding `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "BRIDGE_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply process
/// environment overrides, then validate.
///
/// Called once at startup; the result is immutable for the process lifetime.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => BridgeConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply overrides from a key lookup (the process environment in production).
pub fn apply_env_overrides<F>(mut config: BridgeConfig, lookup: F) -> BridgeConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_CHAIN_SERVICE_URL) {
        config.chain_service.base_url = url;
    }
    if let Some(secret) = lookup(ENV_WEBHOOK_SECRET) {
        config.webhook.secret = Some(secret);
    }
    if let Some(path) = lookup(ENV_DB_PATH) {
        config.database.path = path;
    }
    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
    config
}
