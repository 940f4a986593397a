//! Reload intervals and swap-token cache policy.

use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::application::RefreshPolicy;

const fn default_interval_secs() -> u64 {
    60
}

/// Seconds between full-table reloads, per manager.
#[derive(Debug, Clone, Deserialize)]
pub struct ReloadConfig {
    #[serde(default = "default_interval_secs")]
    pub chains_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub tokens_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub accounts_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub makers_secs: u64,
    #[serde(default = "default_interval_secs")]
    pub dtcs_secs: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            chains_secs: default_interval_secs(),
            tokens_secs: default_interval_secs(),
            accounts_secs: default_interval_secs(),
            makers_secs: default_interval_secs(),
            dtcs_secs: default_interval_secs(),
        }
    }
}

const fn default_refresh_secs() -> u64 {
    3600
}

const fn default_expire_secs() -> u64 {
    1800
}

fn default_evict_at() -> NaiveTime {
    NaiveTime::from_hms_opt(4, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Swap-token cache: entries refresh after `refresh_secs` and are dropped
/// once unread for `expire_secs`. Idle entries are swept daily at `evict_at`
/// (local time, `HH:MM:SS`).
#[derive(Debug, Clone, Deserialize)]
pub struct SwapTokenConfig {
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
    #[serde(default = "default_evict_at")]
    pub evict_at: NaiveTime,
}

impl SwapTokenConfig {
    #[must_use]
    pub fn policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            refresh_after: Duration::from_secs(self.refresh_secs),
            expire_after_idle: Duration::from_secs(self.expire_secs),
        }
    }
}

impl Default for SwapTokenConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            expire_secs: default_expire_secs(),
            evict_at: default_evict_at(),
        }
    }
}
