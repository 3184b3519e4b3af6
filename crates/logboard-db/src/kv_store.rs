//! `SQLite` implementation of the `KeyValueStore` port.
//!
//! Writes land in `kv_entries` and are appended to `kv_changes` in the same
//! transaction. Watchers are fed by polling `kv_changes`, which covers writes
//! from this process and from any other process sharing the file.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use logboard_core::{ContextId, KeyValueStore, RepositoryError, StorageChange};

const FEED_CAPACITY: usize = 256;

/// Fixed-width timestamps so `changed_at` compares correctly as text.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Default interval between change-log polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

fn storage_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

/// `SQLite` key-value store shared by every process opening the same file.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    changes: broadcast::Sender<StorageChange>,
    /// Highest `kv_changes.id` already published.
    cursor: AtomicI64,
}

impl SqliteKeyValueStore {
    /// Open the store. Changes already in the log are not replayed.
    pub async fn open(pool: SqlitePool) -> Result<Self, RepositoryError> {
        let (cursor,): (i64,) = sqlx::query_as("SELECT COALESCE(MAX(id), 0) FROM kv_changes")
            .fetch_one(&pool)
            .await
            .map_err(storage_error)?;

        let (changes, _) = broadcast::channel(FEED_CAPACITY);
        Ok(Self {
            pool,
            changes,
            cursor: AtomicI64::new(cursor),
        })
    }

    /// Publish every change logged since the last poll.
    ///
    /// Returns the number of changes published.
    pub async fn poll_changes(&self) -> Result<usize, RepositoryError> {
        let since = self.cursor.load(Ordering::Acquire);
        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            "SELECT id, key, value, origin FROM kv_changes WHERE id > ? ORDER BY id",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut published = 0;
        for (id, key, new_value, origin) in rows {
            self.cursor.store(id, Ordering::Release);

            let Ok(origin) = Uuid::parse_str(&origin) else {
                warn!(id, %origin, "Skipping change with malformed origin");
                continue;
            };

            debug!(id, %key, "Publishing store change");
            // No watchers is fine
            let _ = self.changes.send(StorageChange {
                key,
                new_value,
                origin: ContextId::from_uuid(origin),
            });
            published += 1;
        }
        Ok(published)
    }

    /// Poll the change log on `every` until `cancel` fires.
    pub fn spawn_change_poller(
        self: &Arc<Self>,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(interval = ?every, "Change poller started");

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = store.poll_changes().await {
                            warn!(error = %e, "Change poll failed");
                        }
                    }
                }
            }

            info!("Change poller stopped");
        })
    }

    /// Delete change-log entries older than `max_age`.
    ///
    /// Returns the number of deleted entries.
    pub async fn prune_changes(&self, max_age: chrono::Duration) -> Result<u64, RepositoryError> {
        let cutoff = (Utc::now() - max_age).format(TIMESTAMP_FORMAT).to_string();
        let result = sqlx::query("DELETE FROM kv_changes WHERE changed_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        origin: ContextId,
    ) -> Result<(), RepositoryError> {
        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        sqlx::query("INSERT INTO kv_changes (key, value, origin, changed_at) VALUES (?, ?, ?, ?)")
            .bind(key)
            .bind(value)
            .bind(origin.to_string())
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)
    }

    fn watch(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::setup_test_database;

    async fn store() -> SqliteKeyValueStore {
        SqliteKeyValueStore::open(setup_test_database().await.unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = store().await;
        assert_eq!(store.get("statusType-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = store().await;
        store.set("k", "a", ContextId::new()).await.unwrap();
        store.set("k", "b", ContextId::new()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_poll_publishes_in_commit_order() {
        let store = store().await;
        let mut feed = store.watch();
        let origin = ContextId::new();

        store.set("statusType-1", "collecting", origin).await.unwrap();
        store.set("statusType-1", "unresponsive", origin).await.unwrap();
        assert_eq!(store.poll_changes().await.unwrap(), 2);
        assert_eq!(store.poll_changes().await.unwrap(), 0);

        let first = feed.recv().await.unwrap();
        let second = feed.recv().await.unwrap();
        assert_eq!(first.new_value, "collecting");
        assert_eq!(second.new_value, "unresponsive");
        assert_eq!(second.origin, origin);
    }

    #[tokio::test]
    async fn test_open_does_not_replay_history() {
        let pool = setup_test_database().await.unwrap();
        let writer = SqliteKeyValueStore::open(pool.clone()).await.unwrap();
        writer.set("k", "old", ContextId::new()).await.unwrap();

        let reader = SqliteKeyValueStore::open(pool).await.unwrap();
        assert_eq!(reader.poll_changes().await.unwrap(), 0);
        assert_eq!(reader.get("k").await.unwrap().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_prune_keeps_recent_changes() {
        let store = store().await;
        store.set("k", "v", ContextId::new()).await.unwrap();
        assert_eq!(store.prune_changes(chrono::Duration::hours(1)).await.unwrap(), 0);
        assert_eq!(store.prune_changes(chrono::Duration::seconds(-60)).await.unwrap(), 1);
    }
}
