//! End-to-end scenarios for the dashboard engine.
//!
//! These tests wire the stream store, status channels, aggregator and table
//! together over the in-memory store. No disk, network or wall clock is
//! involved; time comes from a `FixedClock`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use logboard_core::{
    AppLogRecord, BUCKET_COUNT, BoardEvent, BoardStatus, Column, DeliveryScope, FixedClock,
    FolderStatusView, KeyValueStore, LiveTable, LogKind, LogRecord, LogStreamStore,
    MemoryKeyValueStore, StatusSyncChannel, TimeRange, TimeWindowAggregator,
};
use tokio::time::timeout;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn app(timestamp: &str, level: &str, message: &str) -> AppLogRecord {
    AppLogRecord {
        timestamp: timestamp.to_string(),
        level: level.to_string(),
        logger: "ingest".to_string(),
        message: message.to_string(),
    }
}

// ── Bounded stream ─────────────────────────────────────────────────

#[test]
fn buffer_holds_exactly_the_latest_fifty_newest_first() {
    for total in [1_usize, 49, 50, 51, 137] {
        let store = LogStreamStore::default();
        for i in 0..total {
            store.append(app("2024-05-01 09:59:00", "INFO", &i.to_string()));
        }

        let messages: Vec<String> = store
            .read_all(LogKind::App)
            .iter()
            .map(|r| r.value(Column::Message))
            .collect();
        let expected: Vec<String> = (total.saturating_sub(50)..total)
            .rev()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(messages, expected, "after {total} appends");
    }
}

#[test]
fn subscriber_never_observes_a_stale_buffer() {
    let store = LogStreamStore::default();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let reader = store.clone();
    let log = seen.clone();
    let _subscription = store.subscribe(move |event| {
        if let BoardEvent::RecordAppended { kind } = event {
            let newest = reader.read_all(*kind)[0].value(Column::Message);
            log.lock().unwrap().push(newest);
        }
    });

    for message in ["a", "b", "c"] {
        store.append(app("2024-05-01 09:59:00", "INFO", message));
    }
    assert_eq!(*seen.lock().unwrap(), ["a", "b", "c"]);
}

// ── Status synchronization ─────────────────────────────────────────

#[tokio::test]
async fn first_read_persists_unresponsive_for_other_readers() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    let first = StatusSyncChannel::new(store.clone());
    let second = StatusSyncChannel::new(store.clone());

    assert_eq!(first.status(21).await, BoardStatus::Unresponsive);
    assert_eq!(
        store.get("statusType-21").await.unwrap().as_deref(),
        Some("unresponsive")
    );
    assert_eq!(second.status(21).await, BoardStatus::Unresponsive);
}

#[tokio::test]
async fn write_then_read_round_trips_and_notifies_same_context() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let channel = StatusSyncChannel::new(store);
    let mut early_subscriber = channel.subscribe();

    channel.set_status(7, BoardStatus::Collecting).await;

    assert_eq!(channel.status(7).await, BoardStatus::Collecting);
    let notification = timeout(Duration::from_secs(1), early_subscriber.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notification.board_id, 7);
    assert_eq!(notification.status, BoardStatus::Collecting);
    assert_eq!(notification.scope, DeliveryScope::Local);
}

#[tokio::test]
async fn two_contexts_converge_on_last_write() {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryKeyValueStore::new());
    let tab_a = Arc::new(StatusSyncChannel::new(store.clone()));
    let tab_b = Arc::new(StatusSyncChannel::new(store.clone()));

    let mut view_a = FolderStatusView::load(tab_a.clone(), [12]).await;
    let mut view_b = FolderStatusView::load(tab_b.clone(), [12]).await;
    let mut feed_a = tab_a.subscribe();
    let mut feed_b = tab_b.subscribe();

    tab_a.set_status(12, BoardStatus::Collecting).await;
    tab_b.set_status(12, BoardStatus::Unresponsive).await;

    assert_eq!(
        store.get("statusType-12").await.unwrap().as_deref(),
        Some("unresponsive")
    );

    // Each tab drains its two notifications (one local, one cross-context)
    for _ in 0..2 {
        let n = timeout(Duration::from_secs(1), feed_a.recv()).await.unwrap().unwrap();
        view_a.apply(&n).await;
        let n = timeout(Duration::from_secs(1), feed_b.recv()).await.unwrap().unwrap();
        view_b.apply(&n).await;
    }

    assert_eq!(view_a.status(12), Some(BoardStatus::Unresponsive));
    assert_eq!(view_b.status(12), Some(BoardStatus::Unresponsive));
}

// ── Trend series ───────────────────────────────────────────────────

#[test]
fn one_hour_series_has_twelve_increasing_buckets_covering_the_window() {
    let clock = Arc::new(FixedClock::new(now()));
    let aggregator = TimeWindowAggregator::new(TimeRange::OneHour, clock);

    let records: Vec<LogRecord> = [
        "2024-05-01 08:30:00", // outside
        "2024-05-01 09:00:00",
        "2024-05-01 09:17:42",
        "2024-05-01 09:59:59",
        "2024-05-01 10:00:00", // the instant of computation is excluded
        "bogus",
    ]
    .into_iter()
    .map(|ts| app(ts, "INFO", "x").into())
    .collect();

    let buckets = aggregator.buckets(&records, |_| true);
    assert_eq!(buckets.len(), BUCKET_COUNT);
    assert_eq!(buckets[0].label, "09:00");
    assert_eq!(buckets[BUCKET_COUNT - 1].label, "09:55");
    assert!(buckets.windows(2).all(|w| w[0].label < w[1].label));
    assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 3);
}

// ── Live table ─────────────────────────────────────────────────────

#[test]
fn keyword_and_level_filters_over_the_live_buffer() {
    let store = LogStreamStore::default();
    for level in ["INFO", "ERROR", "WARN"] {
        store.append(app("2024-05-01 09:59:00", level, "tick"));
    }
    let snapshot = store.read_all(LogKind::App);
    let table = LiveTable::new(LogKind::App);

    let by_keyword = table.visible_rows(&snapshot, &table.filter_state().with_keyword("error"));
    assert_eq!(by_keyword.len(), 1);
    assert_eq!(by_keyword[0].value(Column::Level), "ERROR");

    let state = table
        .filter_state()
        .with_keyword("")
        .with_filter(Column::Level, "WARN");
    let by_level = table.visible_rows(&snapshot, &state);
    assert_eq!(by_level.len(), 1);
    assert_eq!(by_level[0].value(Column::Level), "WARN");

    // Distinct values come from the unfiltered buffer
    assert_eq!(
        table.distinct_values(&snapshot)[&Column::Level],
        ["ERROR", "INFO", "WARN"]
    );
}

#[test]
fn visible_rows_are_a_pure_function_of_inputs() {
    let store = LogStreamStore::default();
    store.append(app("2024-05-01 09:00:00", "INFO", "one"));
    store.append(app("2024-05-01 08:00:00", "WARN", "two"));
    store.append(app("not a time", "INFO", "three"));

    let snapshot = store.read_all(LogKind::App);
    let table = LiveTable::new(LogKind::App);
    let state = table.filter_state().with_keyword("o");

    let first = table.visible_rows(&snapshot, &state);
    let second = table.visible_rows(&snapshot, &state);
    assert_eq!(first, second);
    assert_eq!(store.read_all(LogKind::App), snapshot);
}
