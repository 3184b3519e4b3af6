//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core engine expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - The key-value store is the only resource shared across sync contexts
//! - Wall-clock access goes through `Clock` so windows can be anchored in tests

pub mod clock;
pub mod key_value_store;

use thiserror::Error;

pub use clock::{Clock, FixedClock, SystemClock};
pub use key_value_store::{ContextId, KeyValueStore, MemoryKeyValueStore, StorageChange};

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage backend error (database, filesystem, quota, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// The backend refused access (read-only or private mode).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Core error type for semantic domain errors.
///
/// The engine itself never surfaces errors to consumers; this type covers
/// configuration and adapter setup. Adapters map it to their own error types
/// (CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// A user-supplied name did not parse.
    #[error(transparent)]
    Parse(#[from] crate::domain::DomainParseError),

    /// Path resolution failed.
    #[error(transparent)]
    Path(#[from] crate::paths::PathError),
}
