//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe infrastructure dependencies such as the
//! reference store, chain endpoints, remote configuration and alerting.

pub mod alert;
pub mod chain_rpc;
pub mod remote_config;
pub mod store;
pub mod transport;
