//! SQLite database modules.
//!
//! Connection management, schema definitions and Diesel row types for the
//! reference tables.

pub mod connection;
pub mod model;
pub mod schema;
