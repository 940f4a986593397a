//! Outbound adapters (driven side).

pub mod alert;
pub mod config;
pub mod rpc;
pub mod sqlite;
pub mod transport;
