#![allow(dead_code)]

pub mod temp_db;

pub use temp_db::TempDb;
