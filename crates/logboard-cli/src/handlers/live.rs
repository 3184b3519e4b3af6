//! Live view command handler.
//!
//! Runs the mock ingestion generator against the in-memory stream store and
//! prints the trend series and the filtered table as they recompute.

use std::time::Duration;

use anyhow::Result;
use futures_util::StreamExt;
use logboard_core::table::default_filter_columns;
use logboard_core::{
    Column, FilterState, LiveTable, LogKind, SortDirection, TimeRange, TimeWindowAggregator,
};
use logboard_runtime::{
    MockLogGenerator, MockRecordFactory, SeriesFrame, SeriesTicker, TableSnapshot, TableWatcher,
};
use serde_json::json;
use tokio::sync::watch;
use tracing::info;

use crate::bootstrap::CliContext;
use crate::handlers::interrupted;
use crate::presentation::{format_series, format_table, print_separator};

/// Options for one live session.
#[derive(Debug, Clone)]
pub struct LiveOptions {
    pub range: TimeRange,
    pub kind: LogKind,
    pub keyword: Option<String>,
    pub filters: Vec<(Column, String)>,
    pub ascending: bool,
    pub rows: usize,
    pub json: bool,
    pub duration: Option<Duration>,
}

impl LiveOptions {
    /// Table with the default filter columns plus any column filtered on.
    pub fn table(&self) -> LiveTable {
        let mut columns = default_filter_columns(self.kind).to_vec();
        for (column, _) in &self.filters {
            if !columns.contains(column) {
                columns.push(*column);
            }
        }
        LiveTable::with_filter_columns(self.kind, columns)
    }

    /// Initial filter state for `table`.
    pub fn filter_state(&self, table: &LiveTable) -> FilterState {
        let mut state = table
            .filter_state()
            .with_sort(SortDirection::from_ascending(self.ascending));
        if let Some(keyword) = &self.keyword {
            state.set_keyword(keyword.clone());
        }
        for (column, value) in &self.filters {
            state.select(*column, value.clone());
        }
        state
    }
}

/// Execute the live command until interrupted.
pub async fn execute(ctx: &CliContext, options: LiveOptions) -> Result<()> {
    let cancel_token = ctx.cancel_token.child_token();

    let generator = MockLogGenerator::new(
        ctx.stream.clone(),
        MockRecordFactory::new(ctx.clock.clone()),
        ctx.settings.ingest_interval(),
        cancel_token.clone(),
    )
    .spawn();

    let aggregator = TimeWindowAggregator::new(options.range, ctx.clock.clone())
        .with_policy(ctx.settings.bucket_policy);
    let frames = SeriesTicker::new(
        ctx.stream.clone(),
        aggregator,
        options.kind,
        ctx.settings.refresh_interval(),
        cancel_token.clone(),
    )
    .with_thresholds(ctx.settings.thresholds())
    .run();

    let table = options.table();
    let (_filters_tx, filters_rx) = watch::channel(options.filter_state(&table));
    let snapshots =
        TableWatcher::new(ctx.stream.clone(), table, filters_rx, cancel_token.clone()).watch();

    tokio::pin!(frames);
    tokio::pin!(snapshots);
    let stop = interrupted(options.duration);
    tokio::pin!(stop);

    info!(kind = %options.kind, range = %options.range, "Live view started");
    loop {
        tokio::select! {
            () = &mut stop => break,
            Some(frame) = frames.next() => print_frame(&frame, options.json)?,
            Some(snapshot) = snapshots.next() => print_snapshot(&options, &snapshot)?,
            else => break,
        }
    }

    cancel_token.cancel();
    let ticks = generator.await?;
    let metrics = ctx.stream.metrics();
    info!(
        ticks,
        appended = metrics.total_appended,
        evicted = metrics.total_evicted,
        "Live view stopped"
    );
    Ok(())
}

fn print_frame(frame: &SeriesFrame, as_json: bool) -> Result<()> {
    if as_json {
        let frame = serde_json::to_value(frame)?;
        println!("{}", json!({ "series": frame }));
    } else {
        println!("{}", format_series(frame));
    }
    Ok(())
}

fn print_snapshot(options: &LiveOptions, snapshot: &TableSnapshot) -> Result<()> {
    if options.json {
        let snapshot = serde_json::to_value(snapshot)?;
        println!("{}", json!({ "table": snapshot }));
    } else {
        print!("{}", format_table(options.kind, snapshot, options.rows));
        print_separator(80);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> LiveOptions {
        LiveOptions {
            range: TimeRange::OneHour,
            kind: LogKind::Web,
            keyword: Some("api".into()),
            filters: vec![
                (Column::Method, "GET".into()),
                (Column::Ip, "10.0.0.1".into()),
            ],
            ascending: true,
            rows: 10,
            json: false,
            duration: None,
        }
    }

    #[test]
    fn test_table_adds_filtered_columns() {
        let table = options().table();
        assert_eq!(
            table.filter_columns(),
            [Column::Method, Column::Status, Column::Ip]
        );
    }

    #[test]
    fn test_filter_state_from_options() {
        let options = options();
        let state = options.filter_state(&options.table());
        assert_eq!(state.keyword, "api");
        assert_eq!(state.selection(Column::Method), Some("GET"));
        assert_eq!(state.selection(Column::Ip), Some("10.0.0.1"));
        assert_eq!(state.selection(Column::Status), None);
        assert_eq!(state.sort, SortDirection::Ascending);
    }
}
