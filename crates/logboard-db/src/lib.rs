//! `SQLite` adapter for the logboard key-value store port.
//!
//! Several processes opening the same database file form one sync domain:
//! a status written by one is delivered to the others by their change
//! pollers.
#![deny(unsafe_code)]

pub mod kv_store;
pub mod setup;

pub use kv_store::{DEFAULT_POLL_INTERVAL, SqliteKeyValueStore};
pub use setup::{setup_database, setup_test_database};
