use std::env;
use thiserror::Error;

use crate::ids::INVITE_CODE_LENS;
use crate::store::StoreOptions;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("FRESHSPLIT_PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("FRESHSPLIT_INVITE_CODE_LEN must be between 4 and 12, got {0:?}")]
    InvalidInviteCodeLength(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store: StoreOptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup("FRESHSPLIT_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("FRESHSPLIT_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(len) = lookup("FRESHSPLIT_INVITE_CODE_LEN") {
            config.store.invite_code_len = len
                .trim()
                .parse()
                .ok()
                .filter(|len| INVITE_CODE_LENS.contains(len))
                .ok_or(ConfigError::InvalidInviteCodeLength(len))?;
        }
        Ok(config)
    }
}
