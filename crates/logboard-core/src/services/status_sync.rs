//! Board status synchronization across components and sync contexts.
//!
//! Status values live in the shared [`KeyValueStore`] under
//! `statusType-{boardId}`. A write is announced twice: on this context's
//! local broadcast (same-context listeners) and, through the store's change
//! feed, to every other context sharing the store. [`StatusSubscription`]
//! merges both into one stream of [`StatusNotification`]s.
//!
//! Store failures never reach callers. They are logged and the last value
//! known to this context stands.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::domain::{BoardId, BoardStatus, board_id_from_key, status_key};
use crate::events::BoardEvent;
use crate::ports::{ContextId, KeyValueStore, StorageChange};

const LOCAL_CHANNEL_CAPACITY: usize = 64;

/// Where a notification originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryScope {
    /// Written through the same channel instance.
    Local,
    /// Written by another context sharing the store.
    CrossContext,
}

/// A board status change delivered to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotification {
    pub board_id: BoardId,
    pub status: BoardStatus,
    pub scope: DeliveryScope,
}

/// One sync context's view of the shared board statuses.
pub struct StatusSyncChannel {
    context: ContextId,
    store: Arc<dyn KeyValueStore>,
    local: broadcast::Sender<BoardEvent>,
    last_known: RwLock<HashMap<BoardId, BoardStatus>>,
}

impl StatusSyncChannel {
    /// Open a channel with a fresh context id.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_context(store, ContextId::new())
    }

    pub fn with_context(store: Arc<dyn KeyValueStore>, context: ContextId) -> Self {
        let (local, _) = broadcast::channel(LOCAL_CHANNEL_CAPACITY);
        Self {
            context,
            store,
            local,
            last_known: RwLock::new(HashMap::new()),
        }
    }

    pub const fn context_id(&self) -> ContextId {
        self.context
    }

    /// Read a board's status.
    ///
    /// An absent key is initialized to `Unresponsive` so later readers see
    /// the same value. If the store cannot be read, the last value known to
    /// this context is returned (`Unresponsive` if none).
    pub async fn status(&self, board_id: BoardId) -> BoardStatus {
        let key = status_key(board_id);
        match self.store.get(&key).await {
            Ok(Some(raw)) => {
                let status = BoardStatus::parse_persisted(&raw);
                self.remember(board_id, status);
                status
            }
            Ok(None) => {
                let status = BoardStatus::default();
                if let Err(e) = self.store.set(&key, status.as_str(), self.context).await {
                    warn!(board_id, error = %e, "Failed to initialize board status");
                }
                self.remember(board_id, status);
                status
            }
            Err(e) => {
                warn!(board_id, error = %e, "Failed to read board status, using last known value");
                self.last_known(board_id).unwrap_or_default()
            }
        }
    }

    /// Write a board's status and notify this context's subscribers.
    ///
    /// Other contexts learn about the write through the store's change feed.
    pub async fn set_status(&self, board_id: BoardId, status: BoardStatus) {
        self.remember(board_id, status);

        if let Err(e) = self
            .store
            .set(&status_key(board_id), status.as_str(), self.context)
            .await
        {
            warn!(board_id, %status, error = %e, "Failed to persist board status");
        }

        debug!(board_id, %status, context = %self.context, "Board status changed");
        // No subscribers is fine
        let _ = self.local.send(BoardEvent::status_changed(board_id, status));
    }

    /// Map a server-reported label and write the result.
    pub async fn apply_server_status(&self, board_id: BoardId, label: &str) -> BoardStatus {
        let status = BoardStatus::from_server_label(label);
        self.set_status(board_id, status).await;
        status
    }

    /// Flip a board between collecting and unresponsive (manual override).
    pub async fn toggle_status(&self, board_id: BoardId) -> BoardStatus {
        let next = self.status(board_id).await.toggled();
        self.set_status(board_id, next).await;
        next
    }

    /// Subscribe to status changes from this and every other context.
    pub fn subscribe(&self) -> StatusSubscription {
        StatusSubscription {
            context: self.context,
            local: Some(self.local.subscribe()),
            remote: Some(self.store.watch()),
        }
    }

    /// The value this context last read or wrote, without touching the store.
    pub fn last_known(&self, board_id: BoardId) -> Option<BoardStatus> {
        self.last_known
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&board_id)
            .copied()
    }

    fn remember(&self, board_id: BoardId, status: BoardStatus) {
        self.last_known
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(board_id, status);
    }
}

/// Unified receiver over local broadcasts and the store's change feed.
///
/// Changes written by the owning context arrive once, as `Local`. Store keys
/// outside the status namespace are ignored.
pub struct StatusSubscription {
    context: ContextId,
    local: Option<broadcast::Receiver<BoardEvent>>,
    remote: Option<broadcast::Receiver<StorageChange>>,
}

impl StatusSubscription {
    /// Wait for the next status change.
    ///
    /// Returns `None` once both sources are closed. Lagging drops the missed
    /// notifications; listeners re-read the store on the next one.
    pub async fn recv(&mut self) -> Option<StatusNotification> {
        loop {
            let (local, remote) = (self.local.as_mut(), self.remote.as_mut());
            let next = match (local, remote) {
                (None, None) => return None,
                (Some(local), None) => Source::Local(local.recv().await),
                (None, Some(remote)) => Source::Remote(remote.recv().await),
                (Some(local), Some(remote)) => tokio::select! {
                    event = local.recv() => Source::Local(event),
                    change = remote.recv() => Source::Remote(change),
                },
            };

            match next {
                Source::Local(Ok(BoardEvent::StatusChanged {
                    board_id,
                    status_type,
                })) => {
                    return Some(StatusNotification {
                        board_id,
                        status: status_type,
                        scope: DeliveryScope::Local,
                    });
                }
                Source::Local(Ok(_)) => {}
                Source::Remote(Ok(change)) => {
                    if let Some(notification) = self.from_change(&change) {
                        return Some(notification);
                    }
                }
                Source::Local(Err(RecvError::Lagged(missed)))
                | Source::Remote(Err(RecvError::Lagged(missed))) => {
                    warn!(missed, "Status subscriber lagged");
                }
                Source::Local(Err(RecvError::Closed)) => self.local = None,
                Source::Remote(Err(RecvError::Closed)) => self.remote = None,
            }
        }
    }

    fn from_change(&self, change: &StorageChange) -> Option<StatusNotification> {
        if change.origin == self.context {
            return None;
        }
        let board_id = board_id_from_key(&change.key)?;
        Some(StatusNotification {
            board_id,
            status: BoardStatus::parse_persisted(&change.new_value),
            scope: DeliveryScope::CrossContext,
        })
    }
}

enum Source {
    Local(Result<BoardEvent, RecvError>),
    Remote(Result<StorageChange, RecvError>),
}
