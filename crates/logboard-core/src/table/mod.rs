//! Live table filtering and sorting.
//!
//! The table is a pure function of a buffer snapshot and a [`FilterState`].
//! It never mutates the snapshot, and calling it twice with the same inputs
//! yields the same rows.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{Column, LogKind, LogRecord};

/// Distinct values per filterable column, sorted, empty strings excluded.
pub type DistinctValues = BTreeMap<Column, Vec<String>>;

/// Sort order of the timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    /// Newest first.
    #[default]
    Descending,
}

impl SortDirection {
    pub const fn from_ascending(ascending: bool) -> Self {
        if ascending {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

/// User input driving a table: keyword, per-column selections, sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub keyword: String,
    filters: BTreeMap<Column, Option<String>>,
    pub sort: SortDirection,
}

impl FilterState {
    /// Empty state with an unselected filter for each column.
    pub fn for_columns(columns: &[Column]) -> Self {
        Self {
            filters: columns.iter().map(|c| (*c, None)).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    #[must_use]
    pub fn with_filter(mut self, column: Column, value: impl Into<String>) -> Self {
        self.select(column, value);
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: SortDirection) -> Self {
        self.sort = sort;
        self
    }

    pub fn set_keyword(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
    }

    /// Select a value for a column, adding the column if needed.
    pub fn select(&mut self, column: Column, value: impl Into<String>) {
        self.filters.insert(column, Some(value.into()));
    }

    /// Remove a column's selection, keeping the column.
    pub fn clear(&mut self, column: Column) {
        if let Some(selection) = self.filters.get_mut(&column) {
            *selection = None;
        }
    }

    pub fn selection(&self, column: Column) -> Option<&str> {
        self.filters.get(&column)?.as_deref()
    }

    /// Columns with a selected value.
    pub fn active_filters(&self) -> impl Iterator<Item = (Column, &str)> {
        self.filters
            .iter()
            .filter_map(|(column, value)| value.as_deref().map(|v| (*column, v)))
    }

    /// Clear selections whose value is no longer among the distinct values.
    ///
    /// Returns the cleared columns.
    pub fn prune_stale(&mut self, distinct: &DistinctValues) -> Vec<Column> {
        let mut cleared = Vec::new();
        for (column, selection) in &mut self.filters {
            let stale = selection.as_ref().is_some_and(|value| {
                distinct
                    .get(column)
                    .is_none_or(|values| !values.iter().any(|v| v == value))
            });
            if stale {
                *selection = None;
                cleared.push(*column);
            }
        }
        cleared
    }
}

/// Columns offered as equality filters by default.
pub const fn default_filter_columns(kind: LogKind) -> &'static [Column] {
    match kind {
        LogKind::App => &[Column::Level],
        LogKind::Web => &[Column::Method, Column::Status],
    }
}

/// Filter/sort engine for one log table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTable {
    kind: LogKind,
    filter_columns: Vec<Column>,
}

impl LiveTable {
    pub fn new(kind: LogKind) -> Self {
        Self::with_filter_columns(kind, default_filter_columns(kind).to_vec())
    }

    pub const fn with_filter_columns(kind: LogKind, filter_columns: Vec<Column>) -> Self {
        Self {
            kind,
            filter_columns,
        }
    }

    pub const fn kind(&self) -> LogKind {
        self.kind
    }

    pub fn filter_columns(&self) -> &[Column] {
        &self.filter_columns
    }

    /// Empty filter state for this table's columns.
    pub fn filter_state(&self) -> FilterState {
        FilterState::for_columns(&self.filter_columns)
    }

    /// Visible rows: keyword match, then equality filters, then a stable
    /// timestamp sort. Unparseable timestamps sort as oldest.
    pub fn visible_rows(&self, records: &[LogRecord], state: &FilterState) -> Vec<LogRecord> {
        let keyword = state.keyword.to_lowercase();

        let mut rows: Vec<LogRecord> = records
            .iter()
            .filter(|record| {
                keyword.is_empty()
                    || record
                        .values()
                        .any(|value| value.to_lowercase().contains(&keyword))
            })
            .filter(|record| {
                state
                    .active_filters()
                    .all(|(column, selected)| record.value(column) == selected)
            })
            .cloned()
            .collect();

        match state.sort {
            SortDirection::Ascending => rows.sort_by_cached_key(LogRecord::parsed_timestamp),
            SortDirection::Descending => rows.sort_by_cached_key(|r| Reverse(r.parsed_timestamp())),
        }
        rows
    }

    /// Distinct values of every filter column over the unfiltered snapshot.
    pub fn distinct_values(&self, records: &[LogRecord]) -> DistinctValues {
        self.filter_columns
            .iter()
            .map(|column| (*column, distinct(records, *column)))
            .collect()
    }
}

/// Sorted distinct non-empty values of one column.
pub fn distinct(records: &[LogRecord], column: Column) -> Vec<String> {
    records
        .iter()
        .map(|record| record.value(column))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
