//! Environment-backed configuration.
//!
//! Nothing in the client reads the environment on its own; load a [`Config`] once
//! at startup and hand it to [`KavenegarClient::from_config`](crate::KavenegarClient::from_config).

use std::time::Duration;

use crate::domain::{ApiKey, ValidationError};

pub const API_KEY_VAR: &str = "KAVENEGAR_API_KEY";
pub const SENDER_VAR: &str = "SENDER_NUMBER";
pub const RECEPTOR_VAR: &str = "RECEPTOR_NUMBER";
pub const TIMEOUT_VAR: &str = "KAVENEGAR_TIMEOUT";

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} environment variable is required")]
    Missing { var: &'static str },

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: ApiKey,
    /// Default sender line number.
    pub sender: Option<String>,
    /// Default receptor, mostly useful for demos and smoke tests.
    pub receptor: Option<String>,
    pub timeout: Duration,
}

impl Config {
    /// Load from the process environment, reading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR).ok_or(ConfigError::Missing { var: API_KEY_VAR })?;
        let timeout = match non_empty(TIMEOUT_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: TIMEOUT_VAR,
                        value: raw,
                    });
                }
            },
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_key: ApiKey::new(api_key)?,
            sender: non_empty(SENDER_VAR),
            receptor: non_empty(RECEPTOR_VAR),
            timeout,
        })
    }
}
