//! Live table recomputation.

use std::sync::Arc;

use async_stream::stream;
use futures_util::Stream;
use logboard_core::{
    BoardEvent, DistinctValues, FilterState, LiveTable, LogRecord, LogStreamStore,
};
use serde::Serialize;
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Visible rows plus the filter picker values, from one buffer snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub rows: Vec<LogRecord>,
    pub distinct: DistinctValues,
}

impl TableSnapshot {
    pub fn compute(table: &LiveTable, records: &[LogRecord], state: &FilterState) -> Self {
        Self {
            rows: table.visible_rows(records, state),
            distinct: table.distinct_values(records),
        }
    }
}

/// Recompute a table on every buffer change and every filter change.
pub struct TableWatcher {
    store: LogStreamStore,
    table: LiveTable,
    filters: watch::Receiver<FilterState>,
    cancel_token: CancellationToken,
}

impl TableWatcher {
    pub const fn new(
        store: LogStreamStore,
        table: LiveTable,
        filters: watch::Receiver<FilterState>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            table,
            filters,
            cancel_token,
        }
    }

    /// Start watching and return the stream of snapshots.
    ///
    /// The first snapshot is yielded immediately. The stream completes on
    /// cancellation or when the filter sender is dropped.
    pub fn watch(self) -> impl Stream<Item = TableSnapshot> {
        let Self {
            store,
            table,
            mut filters,
            cancel_token,
        } = self;

        stream! {
            let kind = table.kind();
            let changed = Arc::new(Notify::new());
            let _subscription = {
                let changed = changed.clone();
                store.subscribe(move |event| match event {
                    BoardEvent::RecordAppended { kind: appended } if *appended == kind => {
                        changed.notify_one();
                    }
                    BoardEvent::StreamReset => changed.notify_one(),
                    _ => {}
                })
            };

            debug!(%kind, "Starting table watcher");
            loop {
                let state = filters.borrow_and_update().clone();
                yield TableSnapshot::compute(&table, &store.read_all(kind), &state);

                tokio::select! {
                    () = cancel_token.cancelled() => break,
                    () = changed.notified() => {}
                    result = filters.changed() => {
                        if result.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!(%kind, "Table watcher stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use logboard_core::{AppLogRecord, Column, LogKind};

    fn app(level: &str) -> AppLogRecord {
        AppLogRecord {
            timestamp: "2024-05-01 10:00:00".to_string(),
            level: level.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_snapshots_follow_buffer_and_filters() {
        let store = LogStreamStore::default();
        store.append(app("INFO"));

        let table = LiveTable::new(LogKind::App);
        let (filters_tx, filters_rx) = watch::channel(table.filter_state());
        let cancel = CancellationToken::new();
        let snapshots = TableWatcher::new(store.clone(), table, filters_rx, cancel.clone()).watch();
        tokio::pin!(snapshots);

        let first = snapshots.next().await.unwrap();
        assert_eq!(first.rows.len(), 1);

        store.append(app("ERROR"));
        let second = snapshots.next().await.unwrap();
        assert_eq!(second.rows.len(), 2);
        assert_eq!(second.distinct[&Column::Level], ["ERROR", "INFO"]);

        filters_tx.send_modify(|state| state.select(Column::Level, "ERROR"));
        let third = snapshots.next().await.unwrap();
        assert_eq!(third.rows.len(), 1);
        assert_eq!(third.distinct[&Column::Level], ["ERROR", "INFO"]);

        cancel.cancel();
        assert!(snapshots.next().await.is_none());
    }

    #[tokio::test]
    async fn test_ends_when_filter_sender_dropped() {
        let store = LogStreamStore::default();
        let table = LiveTable::new(LogKind::Web);
        let (filters_tx, filters_rx) = watch::channel(table.filter_state());
        let snapshots =
            TableWatcher::new(store, table, filters_rx, CancellationToken::new()).watch();
        tokio::pin!(snapshots);

        snapshots.next().await.unwrap();
        drop(filters_tx);
        assert!(snapshots.next().await.is_none());
    }
}
