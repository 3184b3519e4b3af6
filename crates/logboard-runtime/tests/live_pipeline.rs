//! Ingestion-to-view pipeline with a paused tokio clock.
//!
//! The mock generator feeds a shared stream store while a series ticker and
//! a table watcher recompute from it. Cancelling the shared token must stop
//! all three.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::StreamExt;
use logboard_core::{
    Clock, FixedClock, LiveTable, LogKind, LogStreamStore, TimeRange, TimeWindowAggregator,
};
use logboard_runtime::{MockLogGenerator, MockRecordFactory, SeriesTicker, TableWatcher};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

fn clock_at(h: u32, m: u32, s: u32) -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap(),
    ))
}

#[tokio::test(start_paused = true)]
async fn generated_records_flow_into_series_and_table() {
    let store = LogStreamStore::default();
    let cancel = CancellationToken::new();

    let generator = MockLogGenerator::new(
        store.clone(),
        MockRecordFactory::seeded(3, clock_at(10, 0, 0)),
        Duration::from_secs(2),
        cancel.clone(),
    )
    .spawn();

    let aggregator = TimeWindowAggregator::new(TimeRange::OneHour, clock_at(10, 0, 30));
    let frames = SeriesTicker::new(
        store.clone(),
        aggregator,
        LogKind::Web,
        Duration::from_secs(30),
        cancel.clone(),
    )
    .run();
    tokio::pin!(frames);

    // Wait until three ticks have landed in the last bucket
    loop {
        let frame = frames.next().await.unwrap();
        assert_eq!(frame.total.len(), 12);
        if frame.total[11].value == 3 {
            break;
        }
    }

    let table = LiveTable::new(LogKind::Web);
    let (_filters_tx, filters_rx) = watch::channel(table.filter_state());
    let snapshots = TableWatcher::new(store.clone(), table, filters_rx, cancel.clone()).watch();
    tokio::pin!(snapshots);
    let snapshot = snapshots.next().await.unwrap();
    assert_eq!(snapshot.rows.len(), 3);
    assert!(!snapshot.distinct[&logboard_core::Column::Method].is_empty());

    cancel.cancel();
    assert_eq!(generator.await.unwrap(), 3);
    assert!(frames.next().await.is_none());
    assert!(snapshots.next().await.is_none());
    assert_eq!(store.metrics().listeners, 0);
}
