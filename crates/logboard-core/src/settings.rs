//! Dashboard settings and validation.
//!
//! Pure domain types with no infrastructure dependencies. Adapters load the
//! values (environment, flags) and call [`validate_settings`] before wiring.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregate::{BucketPolicy, TimeRange};
use crate::domain::SeverityThresholds;
use crate::stream::DEFAULT_STREAM_CAPACITY;

/// Default interval between forced series recomputations.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;

/// Default cadence of the mock ingestion generator.
pub const DEFAULT_INGEST_INTERVAL_MS: u64 = 2000;

/// Dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardSettings {
    /// Records kept per log kind (1-1000).
    pub stream_capacity: usize,

    /// Range selected when a chart first renders.
    pub default_range: TimeRange,

    /// Seconds between forced series recomputations (5-60).
    pub refresh_interval_secs: u64,

    /// Milliseconds between generated ingestion ticks (>= 100).
    pub ingest_interval_ms: u64,

    /// `aiScore` at or above which a web record is a warning.
    pub warning_score_threshold: u8,

    /// `aiScore` at or above which a web record is a danger.
    pub danger_score_threshold: u8,

    /// Bucket assignment policy for trend charts.
    pub bucket_policy: BucketPolicy,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl DashboardSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            stream_capacity: DEFAULT_STREAM_CAPACITY,
            default_range: TimeRange::OneHour,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            ingest_interval_ms: DEFAULT_INGEST_INTERVAL_MS,
            warning_score_threshold: 50,
            danger_score_threshold: 80,
            bucket_policy: BucketPolicy::Boundary,
        }
    }

    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    #[must_use]
    pub const fn ingest_interval(&self) -> Duration {
        Duration::from_millis(self.ingest_interval_ms)
    }

    #[must_use]
    pub const fn thresholds(&self) -> SeverityThresholds {
        SeverityThresholds {
            warning: self.warning_score_threshold,
            danger: self.danger_score_threshold,
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Stream capacity must be between 1 and 1000, got {0}")]
    InvalidCapacity(usize),

    #[error("Refresh interval must be between 5 and 60 seconds, got {0}")]
    InvalidRefreshInterval(u64),

    #[error("Ingest interval must be at least 100 ms, got {0}")]
    InvalidIngestInterval(u64),

    #[error("Danger threshold ({danger}) must exceed warning threshold ({warning})")]
    InvalidThresholds { warning: u8, danger: u8 },

    #[error("Score thresholds must be at most 100, got {0}")]
    ThresholdOutOfRange(u8),
}

/// Validate settings values.
pub fn validate_settings(settings: &DashboardSettings) -> Result<(), SettingsError> {
    if !(1..=1000).contains(&settings.stream_capacity) {
        return Err(SettingsError::InvalidCapacity(settings.stream_capacity));
    }

    if !(5..=60).contains(&settings.refresh_interval_secs) {
        return Err(SettingsError::InvalidRefreshInterval(
            settings.refresh_interval_secs,
        ));
    }

    if settings.ingest_interval_ms < 100 {
        return Err(SettingsError::InvalidIngestInterval(
            settings.ingest_interval_ms,
        ));
    }

    for threshold in [
        settings.warning_score_threshold,
        settings.danger_score_threshold,
    ] {
        if threshold > 100 {
            return Err(SettingsError::ThresholdOutOfRange(threshold));
        }
    }

    if settings.danger_score_threshold <= settings.warning_score_threshold {
        return Err(SettingsError::InvalidThresholds {
            warning: settings.warning_score_threshold,
            danger: settings.danger_score_threshold,
        });
    }

    Ok(())
}
