//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings. Every
//! section is optional; a missing section takes its defaults.
//!
//! # Example
//!
//! ```no_run
//! use chainhub::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::alert::AlertConfig;
use super::database::DatabaseConfig;
use super::logging::LoggingConfig;
use super::reload::{ReloadConfig, SwapTokenConfig};
use super::rpc::RpcConfig;
use crate::adapter::outbound::config::StaticRemoteConfig;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub reload: ReloadConfig,

    #[serde(default)]
    pub swap_token: SwapTokenConfig,

    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub alert: AlertConfig,

    /// `[remote.<namespace>]` tables of string values, served through the
    /// remote-config port.
    #[serde(default)]
    pub remote: HashMap<String, HashMap<String, String>>,
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database.url" }.into());
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        let reload = &self.reload;
        for (field, secs) in [
            ("reload.chains_secs", reload.chains_secs),
            ("reload.tokens_secs", reload.tokens_secs),
            ("reload.accounts_secs", reload.accounts_secs),
            ("reload.makers_secs", reload.makers_secs),
            ("reload.dtcs_secs", reload.dtcs_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }

        if self.swap_token.refresh_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "swap_token.refresh_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.swap_token.expire_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "swap_token.expire_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.rpc.default_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rpc.default_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected pretty or json, got {:?}", self.logging.format),
            }
            .into());
        }

        Ok(())
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// The `[remote.*]` tables as a remote-config source.
    #[must_use]
    pub fn remote_config(&self) -> StaticRemoteConfig {
        StaticRemoteConfig::new(self.remote.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::port::RemoteConfig;

    #[test]
    fn empty_config_takes_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.database.url, "chainhub.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.reload.chains_secs, 60);
        assert_eq!(config.swap_token.refresh_secs, 3600);
        assert_eq!(config.swap_token.expire_secs, 1800);
        assert_eq!(config.swap_token.evict_at.to_string(), "04:00:00");
        assert_eq!(config.rpc.default_timeout(), Duration::from_secs(10));
        assert!(!config.alert.telegram);
        assert!(config.remote.is_empty());
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse_toml(
            r#"
            [database]
            url = "/var/lib/chainhub/ref.db"

            [logging]
            level = "chainhub=debug"
            format = "json"

            [reload]
            tokens_secs = 15

            [swap_token]
            refresh_secs = 120
            evict_at = "03:30:00"

            [remote.base_config]
            unisat_api_config = '{"Bitcoin":{"Server":"https://u.test"}}'
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "/var/lib/chainhub/ref.db");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.reload.tokens_secs, 15);
        assert_eq!(config.reload.dtcs_secs, 60);
        assert_eq!(config.swap_token.policy().refresh_after, Duration::from_secs(120));
        assert_eq!(config.swap_token.evict_at.to_string(), "03:30:00");
        assert!(config
            .remote_config()
            .get("base_config", "unisat_api_config")
            .unwrap()
            .contains("u.test"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::parse_toml("[reload]\nchains_secs = 0").unwrap_err();
        assert!(err.to_string().contains("reload.chains_secs"));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = Config::parse_toml("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = Config::parse_toml("[database\nurl = 1").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::load("/nonexistent/chainhub.toml").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::ReadFile(_))
        ));
    }
}
