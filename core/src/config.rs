//! Relay configuration.
//!
//! Hosts may pass a JSON document (camelCase keys); anything omitted falls
//! back to the defaults below.

use std::time::Duration;

use serde::Deserialize;

use crate::error::RelayError;

pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_MAX_WORKERS: usize = 16;
pub const DEFAULT_CHANNEL: &str = "com.tfm.metas_app/auth_me";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RelayConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Upper bound on background units running at once. Further invocations
    /// queue until a worker frees up.
    pub max_workers: usize,
    /// Host channel the relay is registered on. Only used in log output.
    pub channel: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_workers: DEFAULT_MAX_WORKERS,
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }
}

impl RelayConfig {
    pub fn from_json(json: &str) -> Result<Self, RelayError> {
        let config: RelayConfig = serde_json::from_str(json)
            .map_err(|e| RelayError::InvalidArguments(format!("invalid relay config: {e}")))?;
        if config.max_workers == 0 {
            return Err(RelayError::InvalidArguments(
                "invalid relay config: maxWorkers must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
