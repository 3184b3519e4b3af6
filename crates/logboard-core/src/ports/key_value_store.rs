//! Shared key-value store port.
//!
//! The store is the only state shared between sync contexts. It offers
//! get/set plus a change feed. Every write is published on the feed,
//! including to the writer's own context; each change carries the writer's
//! `ContextId` so consumers can drop their own echoes.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::RepositoryError;

/// Capacity of change-feed channels. Slow watchers skip ahead on lag.
pub(crate) const CHANGE_FEED_CAPACITY: usize = 256;

/// Identity of one sync context (one dashboard window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Allocate a fresh context id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Rebuild an id read back from storage.
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A committed write, as seen on the change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageChange {
    pub key: String,
    pub new_value: String,
    /// Context that performed the write.
    pub origin: ContextId,
}

/// Shared key-value store with change notification.
///
/// # Design Rules
///
/// - Writes are last-write-wins; there is no compare-and-set
/// - `watch` never fails; a backend without a feed returns a silent receiver
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Write a value on behalf of `origin`.
    async fn set(&self, key: &str, value: &str, origin: ContextId)
    -> Result<(), RepositoryError>;

    /// Subscribe to committed writes.
    fn watch(&self) -> broadcast::Receiver<StorageChange>;
}

/// In-process store. Publishes each write synchronously inside `set`.
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        origin: ContextId,
    ) -> Result<(), RepositoryError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());

        // No watchers is fine
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            new_value: value.to_string(),
            origin,
        });
        Ok(())
    }

    fn watch(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
