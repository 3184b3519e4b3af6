//! Fixed-bucket time-window aggregation for trend charts.
//!
//! A window is always [`BUCKET_COUNT`] contiguous buckets of equal width
//! ending at the clock's current instant. Buckets without matching records
//! report zero; the output is never sparse.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainParseError, LogRecord, Severity};
use crate::ports::Clock;

/// Number of buckets in every window.
pub const BUCKET_COUNT: usize = 12;

/// Retention window selectable on a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
}

impl TimeRange {
    pub const ALL: [Self; 3] = [Self::OneHour, Self::SixHours, Self::TwelveHours];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::TwelveHours => "12h",
        }
    }

    /// Bucket width in minutes.
    pub const fn step_minutes(self) -> i64 {
        match self {
            Self::OneHour => 5,
            Self::SixHours => 30,
            Self::TwelveHours => 60,
        }
    }

    pub fn step(self) -> Duration {
        Duration::minutes(self.step_minutes())
    }

    /// Total window width.
    pub fn span(self) -> Duration {
        Duration::minutes(self.step_minutes() * BUCKET_COUNT as i64)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|range| range.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainParseError::UnknownRange(s.to_string()))
    }
}

/// How a record is assigned to a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketPolicy {
    /// Half-open interval membership `[start, end)`.
    #[default]
    Boundary,
    /// Closest `HH:mm` label compared as a four-digit number.
    ///
    /// Ignores the date and misassigns records near midnight (23:58 is far
    /// from 00:02). Records outside the window are still assigned.
    NearestLabel,
}

impl BucketPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boundary => "boundary",
            Self::NearestLabel => "nearest_label",
        }
    }
}

impl fmt::Display for BucketPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BucketPolicy {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "boundary" => Ok(Self::Boundary),
            "nearest_label" => Ok(Self::NearestLabel),
            _ => Err(DomainParseError::UnknownPolicy(s.to_string())),
        }
    }
}

/// One bucket of a window with its match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    /// Bucket start formatted `HH:mm`.
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub count: usize,
}

/// Single-series chart point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub time: String,
    pub value: usize,
}

/// Two-series chart point (warning vs danger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitSeriesPoint {
    pub time: String,
    pub warning: usize,
    pub danger: usize,
}

/// Buckets records into a window anchored at the clock's "now".
///
/// Every call re-reads the clock, so repeated calls slide the window.
#[derive(Clone)]
pub struct TimeWindowAggregator {
    range: TimeRange,
    policy: BucketPolicy,
    clock: Arc<dyn Clock>,
}

impl TimeWindowAggregator {
    pub fn new(range: TimeRange, clock: Arc<dyn Clock>) -> Self {
        Self {
            range,
            policy: BucketPolicy::default(),
            clock,
        }
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: BucketPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn range(&self) -> TimeRange {
        self.range
    }

    pub const fn policy(&self) -> BucketPolicy {
        self.policy
    }

    /// Count records matching `predicate` per bucket.
    pub fn buckets<P>(&self, records: &[LogRecord], predicate: P) -> Vec<TimeBucket>
    where
        P: Fn(&LogRecord) -> bool,
    {
        let mut buckets = self.empty_window();
        for record in records.iter().filter(|r| predicate(r)) {
            if let Some(index) = self.assign(&buckets, record) {
                buckets[index].count += 1;
            }
        }
        buckets
    }

    /// Chart series counting records matching `predicate`.
    pub fn series<P>(&self, records: &[LogRecord], predicate: P) -> Vec<SeriesPoint>
    where
        P: Fn(&LogRecord) -> bool,
    {
        self.buckets(records, predicate)
            .into_iter()
            .map(|bucket| SeriesPoint {
                time: bucket.label,
                value: bucket.count,
            })
            .collect()
    }

    /// Chart series split by severity. Normal records are not counted.
    pub fn split_series<C>(&self, records: &[LogRecord], classifier: C) -> Vec<SplitSeriesPoint>
    where
        C: Fn(&LogRecord) -> Severity,
    {
        let window = self.empty_window();
        let mut points: Vec<SplitSeriesPoint> = window
            .iter()
            .map(|bucket| SplitSeriesPoint {
                time: bucket.label.clone(),
                warning: 0,
                danger: 0,
            })
            .collect();

        for record in records {
            let severity = classifier(record);
            if !severity.is_abnormal() {
                continue;
            }
            if let Some(index) = self.assign(&window, record) {
                match severity {
                    Severity::Warning => points[index].warning += 1,
                    Severity::Danger => points[index].danger += 1,
                    Severity::Normal => {}
                }
            }
        }
        points
    }

    fn empty_window(&self) -> Vec<TimeBucket> {
        let now = self.clock.now();
        let step = self.range.step();
        let origin = now - self.range.span();

        (0..BUCKET_COUNT as i32)
            .map(|i| {
                let start = origin + step * i;
                let end = if i + 1 == BUCKET_COUNT as i32 {
                    now
                } else {
                    origin + step * (i + 1)
                };
                TimeBucket {
                    label: start.format("%H:%M").to_string(),
                    start,
                    end,
                    count: 0,
                }
            })
            .collect()
    }

    fn assign(&self, window: &[TimeBucket], record: &LogRecord) -> Option<usize> {
        let timestamp = record.parsed_timestamp()?;
        match self.policy {
            BucketPolicy::Boundary => window
                .iter()
                .position(|bucket| bucket.start <= timestamp && timestamp < bucket.end),
            BucketPolicy::NearestLabel => {
                let target = clock_number(timestamp);
                window
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, bucket)| (clock_number(bucket.start) - target).abs())
                    .map(|(index, _)| index)
            }
        }
    }
}

/// `HH:mm` read as a four-digit number (23:58 -> 2358).
fn clock_number(at: NaiveDateTime) -> i64 {
    i64::from(at.hour()) * 100 + i64::from(at.minute())
}
