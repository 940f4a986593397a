//! Alert adapters.
//!
//! Implements the `port::Alerter` trait for the log and for Telegram.

mod log;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use log::LogAlerter;
