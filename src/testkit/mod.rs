//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`store`] - In-memory [`ReferenceStore`](crate::port::ReferenceStore) that can be told to fail.
//! - [`alert`] - An alerter that records what it was sent.
//! - [`transport`] - Scripted JSON transports and the factory handing them out.
//! - [`domain`] - Builders for rows and chains.

pub mod alert;
pub mod domain;
pub mod store;
pub mod transport;

pub use alert::RecordingAlerter;
pub use domain::{chain_info, chain_record, token_record, usdt_route};
pub use store::MemoryStore;
pub use transport::{ScriptedTransport, ScriptedTransportFactory};
