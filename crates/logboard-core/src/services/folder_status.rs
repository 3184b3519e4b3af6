//! Derived status view over the boards of a folder.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::domain::{BoardId, BoardStatus, StatusBadge};

use super::status_sync::{StatusNotification, StatusSyncChannel};

/// Number of boards in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub collecting: usize,
    pub unresponsive: usize,
    pub before: usize,
}

impl StatusCounts {
    pub const fn total(&self) -> usize {
        self.collecting + self.unresponsive + self.before
    }
}

/// Status summary for a set of boards, kept fresh from notifications.
///
/// The view never trusts the notification payload: it re-reads the affected
/// key, so a burst of writes settles on whatever the store holds last.
pub struct FolderStatusView {
    channel: Arc<StatusSyncChannel>,
    statuses: BTreeMap<BoardId, BoardStatus>,
}

impl FolderStatusView {
    /// Build the view, reading every board's current status.
    pub async fn load(
        channel: Arc<StatusSyncChannel>,
        boards: impl IntoIterator<Item = BoardId>,
    ) -> Self {
        let mut view = Self {
            channel,
            statuses: boards
                .into_iter()
                .map(|id| (id, BoardStatus::default()))
                .collect(),
        };
        view.refresh().await;
        view
    }

    /// Re-read every board.
    pub async fn refresh(&mut self) {
        for (board_id, status) in &mut self.statuses {
            *status = self.channel.status(*board_id).await;
        }
    }

    /// React to a notification. Returns whether the view changed.
    pub async fn apply(&mut self, notification: &StatusNotification) -> bool {
        let Some(current) = self.statuses.get(&notification.board_id).copied() else {
            return false;
        };

        let fresh = self.channel.status(notification.board_id).await;
        self.statuses.insert(notification.board_id, fresh);
        fresh != current
    }

    pub fn boards(&self) -> impl Iterator<Item = BoardId> + '_ {
        self.statuses.keys().copied()
    }

    pub fn status(&self, board_id: BoardId) -> Option<BoardStatus> {
        self.statuses.get(&board_id).copied()
    }

    /// Badge per board, ordered by board id.
    pub fn badges(&self) -> Vec<(BoardId, StatusBadge)> {
        self.statuses
            .iter()
            .map(|(id, status)| (*id, status.badge()))
            .collect()
    }

    pub fn counts(&self) -> StatusCounts {
        self.statuses
            .values()
            .fold(StatusCounts::default(), |mut counts, status| {
                match status {
                    BoardStatus::Collecting => counts.collecting += 1,
                    BoardStatus::Unresponsive => counts.unresponsive += 1,
                    BoardStatus::Before => counts.before += 1,
                }
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BadgeColor;
    use crate::ports::{KeyValueStore, MemoryKeyValueStore};

    #[tokio::test]
    async fn test_load_initializes_unseen_boards() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let channel = Arc::new(StatusSyncChannel::new(store));
        let view = FolderStatusView::load(channel, [1, 2, 3]).await;

        assert_eq!(view.counts().unresponsive, 3);
        assert_eq!(view.counts().total(), 3);
    }

    #[tokio::test]
    async fn test_notification_from_other_context_updates_badge() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
        let here = Arc::new(StatusSyncChannel::new(store.clone()));
        let there = StatusSyncChannel::new(store);

        let mut view = FolderStatusView::load(here.clone(), [4, 5]).await;
        let mut subscription = here.subscribe();
        there.set_status(5, BoardStatus::Collecting).await;

        let notification = subscription.recv().await.unwrap();
        assert!(view.apply(&notification).await);
        assert_eq!(view.status(5), Some(BoardStatus::Collecting));
        assert_eq!(view.badges()[1].1.color, BadgeColor::Green);
        assert_eq!(
            view.counts(),
            StatusCounts {
                collecting: 1,
                unresponsive: 1,
                before: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_unrelated_board_is_ignored() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let channel = Arc::new(StatusSyncChannel::new(store));
        let mut view = FolderStatusView::load(channel.clone(), [1]).await;

        let mut subscription = channel.subscribe();
        channel.set_status(99, BoardStatus::Collecting).await;
        let notification = subscription.recv().await.unwrap();

        assert!(!view.apply(&notification).await);
        assert_eq!(view.boards().collect::<Vec<_>>(), [1]);
    }
}
