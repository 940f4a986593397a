//! Chain client defaults.

use std::time::Duration;

use serde::Deserialize;

const fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Used for chain rows whose `timeout` is not positive.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
}

impl RpcConfig {
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
        }
    }
}
