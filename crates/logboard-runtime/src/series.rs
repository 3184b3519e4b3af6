//! Cancellable trend-series recomputation.
//!
//! A [`SeriesTicker`] recomputes a chart's series whenever its stream changes
//! and on a fixed interval, so the window keeps sliding with no new data.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_util::Stream;
use logboard_core::{
    BoardEvent, LogKind, LogStreamStore, SeriesPoint, SeverityThresholds, SplitSeriesPoint,
    TimeWindowAggregator,
};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One recomputation of a stream's charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesFrame {
    pub kind: LogKind,
    /// Every record per bucket.
    pub total: Vec<SeriesPoint>,
    /// Warning and danger records per bucket.
    pub abnormal: Vec<SplitSeriesPoint>,
}

/// Recompute series for one stream until cancelled.
pub struct SeriesTicker {
    store: LogStreamStore,
    aggregator: TimeWindowAggregator,
    thresholds: SeverityThresholds,
    kind: LogKind,
    refresh: Duration,
    cancel_token: CancellationToken,
}

impl SeriesTicker {
    pub fn new(
        store: LogStreamStore,
        aggregator: TimeWindowAggregator,
        kind: LogKind,
        refresh: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            store,
            aggregator,
            thresholds: SeverityThresholds::default(),
            kind,
            refresh,
            cancel_token,
        }
    }

    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: SeverityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Compute a frame from the store's current contents.
    pub fn frame(&self) -> SeriesFrame {
        compute(&self.store, &self.aggregator, self.thresholds, self.kind)
    }

    /// Start recomputing and return the stream of frames.
    ///
    /// The first frame is yielded immediately. The stream completes when the
    /// token is cancelled; its store listener is removed when the stream is
    /// dropped.
    pub fn run(self) -> impl Stream<Item = SeriesFrame> {
        let Self {
            store,
            aggregator,
            thresholds,
            kind,
            refresh,
            cancel_token,
        } = self;

        stream! {
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

            let mut ticker = interval(refresh);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            debug!(%kind, range = %aggregator.range(), "Starting series ticker");

            loop {
                tokio::select! {
                    () = cancel_token.cancelled() => {
                        debug!(%kind, "Series ticker cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        yield compute(&store, &aggregator, thresholds, kind);
                    }
                    () = changed.notified() => {
                        yield compute(&store, &aggregator, thresholds, kind);
                    }
                }
            }
        }
    }
}

fn compute(
    store: &LogStreamStore,
    aggregator: &TimeWindowAggregator,
    thresholds: SeverityThresholds,
    kind: LogKind,
) -> SeriesFrame {
    let records = store.read_all(kind);
    SeriesFrame {
        kind,
        total: aggregator.series(&records, |_| true),
        abnormal: aggregator.split_series(&records, |r| thresholds.classify(r)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use futures_util::StreamExt;
    use logboard_core::{AppLogRecord, FixedClock, TimeRange};

    fn aggregator() -> TimeWindowAggregator {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        TimeWindowAggregator::new(TimeRange::OneHour, Arc::new(FixedClock::new(now)))
    }

    fn error_record() -> AppLogRecord {
        AppLogRecord {
            timestamp: "2024-05-01 09:58:00".to_string(),
            level: "ERROR".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_append_triggers_recompute() {
        let store = LogStreamStore::default();
        let cancel = CancellationToken::new();
        let ticker = SeriesTicker::new(
            store.clone(),
            aggregator(),
            LogKind::App,
            Duration::from_secs(60),
            cancel.clone(),
        );
        let frames = ticker.run();
        tokio::pin!(frames);

        let first = frames.next().await.unwrap();
        assert!(first.total.iter().all(|p| p.value == 0));

        store.append(error_record());
        let second = frames.next().await.unwrap();
        assert_eq!(second.total.last().unwrap().value, 1);
        assert_eq!(second.abnormal.last().unwrap().danger, 1);

        cancel.cancel();
        assert!(frames.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_stream_removes_listener() {
        let store = LogStreamStore::default();
        let ticker = SeriesTicker::new(
            store.clone(),
            aggregator(),
            LogKind::Web,
            Duration::from_secs(60),
            CancellationToken::new(),
        );

        {
            let frames = ticker.run();
            tokio::pin!(frames);
            frames.next().await.unwrap();
            assert_eq!(store.metrics().listeners, 1);
        }
        assert_eq!(store.metrics().listeners, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_recomputes_without_data() {
        let store = LogStreamStore::default();
        let cancel = CancellationToken::new();
        let frames = SeriesTicker::new(
            store,
            aggregator(),
            LogKind::App,
            Duration::from_secs(5),
            cancel.clone(),
        )
        .run();
        tokio::pin!(frames);

        let start = tokio::time::Instant::now();
        for _ in 0..3 {
            frames.next().await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_secs(10));

        cancel.cancel();
        assert!(frames.next().await.is_none());
    }
}
