//! Infrastructure configuration modules.

pub mod alert;
pub mod database;
pub mod logging;
pub mod reload;
pub mod rpc;
pub mod settings;

pub use settings::Config;
