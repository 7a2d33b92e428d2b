/*!
 * Server Configuration
 *
 * Receive bound and poll interval for a port server
 */

use super::types::{IpcError, IpcResult};
use crate::core::limits::{DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_POLL_TIMEOUT_MS};
use crate::core::types::{Size, Timeout};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Environment variable overriding [`ServerConfig::max_message_size`]
pub const ENV_MAX_MESSAGE_SIZE: &str = "PORT_IPC_MAX_MESSAGE_SIZE";

/// Environment variable overriding [`ServerConfig::poll_timeout`] (milliseconds)
pub const ENV_POLL_TIMEOUT_MS: &str = "PORT_IPC_POLL_TIMEOUT_MS";

/// Port server configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ServerConfig {
    /// Largest payload a single `read()` accepts
    pub max_message_size: Size,
    /// Timeout of each receive issued by the dispatch loop
    pub poll_timeout: Timeout,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            poll_timeout: Timeout::millis(DEFAULT_POLL_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn with_max_message_size(mut self, size: Size) -> Self {
        self.max_message_size = size;
        self
    }

    #[must_use]
    pub const fn with_poll_timeout(mut self, timeout: Timeout) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Defaults overridden by `PORT_IPC_*` environment variables
    pub fn from_env() -> IpcResult<Self> {
        let mut config = Self::default();
        if let Some(size) = env_value::<Size>(ENV_MAX_MESSAGE_SIZE)? {
            config.max_message_size = size;
        }
        if let Some(ms) = env_value::<u32>(ENV_POLL_TIMEOUT_MS)? {
            config.poll_timeout = Timeout::millis(ms);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the dispatch loop cannot run with
    pub fn validate(&self) -> IpcResult<()> {
        if self.max_message_size == 0 {
            return Err(IpcError::Validation(
                "max_message_size must be greater than zero".to_string(),
            ));
        }
        // An unbounded poll would make stop() unobservable
        if self.poll_timeout.is_infinite() {
            return Err(IpcError::Validation(
                "poll_timeout must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_value<T: FromStr>(key: &str) -> IpcResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| IpcError::Validation(format!("{}: cannot parse '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}
