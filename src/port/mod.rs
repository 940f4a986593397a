//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! Adapters implement them to integrate with external systems.
//!
//! # Available Ports
//!
//! - [`ReferenceStore`] - Reference tables (chains, tokens, accounts, makers, fee tiers)
//! - [`HttpTransport`], [`TransportFactory`] - JSON over HTTP to chain endpoints
//! - [`ChainRpc`] - Uniform chain access, one implementation per backend
//! - [`RemoteConfig`] - Namespaced remote configuration
//! - [`Alerter`] - Operational alerts

pub mod outbound;

pub use outbound::alert::{Alert, Alerter, AlerterRegistry, NullAlerter};
pub use outbound::chain_rpc::{ChainRpc, TxOutcome};
pub use outbound::remote_config::RemoteConfig;
pub use outbound::store::{
    AccountRecord, ChainRecord, DtcRecord, MakerAddressRecord, MakerGroupRecord, ReferenceStore,
    TokenRecord,
};
pub use outbound::transport::{ChainClient, HttpTransport, TransportFactory, TransportSpec};
