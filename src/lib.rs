//! chainhub - Multi-chain reference data cache and unified chain RPC layer.
//!
//! Gives a multi-chain service one consistent view of slowly changing
//! reference data (chains, tokens, accounts, maker addresses, fee tiers) and
//! one query contract over structurally different chains.
//!
//! # Architecture
//!
//! The crate is laid out hexagonally:
//!
//! - [`domain`] - Chain-agnostic types: chains, tokens, fee tiers, address rules
//! - [`port`] - Traits for the store, transports, chain RPC, remote config, alerts
//! - [`application`] - Snapshot-backed managers, token caches and the reload scheduler
//! - [`adapter`] - SQLite store, reqwest transports, per-backend RPC adapters, CLI
//! - [`infrastructure`] - Configuration and the composition root
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `telegram` - Deliver alerts to a Telegram chat (default)
//! - `testkit` - Export in-memory test doubles for integration tests
//!
//! # Example
//!
//! ```no_run
//! use chainhub::infrastructure::bootstrap::Hub;
//! use chainhub::infrastructure::config::Config;
//!
//! # async fn demo() -> chainhub::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let hub = Hub::from_config(&config)?;
//! hub.load_all()?;
//! let rpc = hub.rpc_for("Ethereum")?;
//! let height = rpc.get_latest_block_number().await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
