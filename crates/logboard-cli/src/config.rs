//! Settings loading for the CLI.
//!
//! Precedence, lowest first: built-in defaults, `LOGBOARD_*` environment
//! variables (including values loaded from `.env`), then command-line flags.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use logboard_core::{
    DashboardSettings, PathError, TimeRange, database_path, database_path_in, validate_settings,
};

use crate::error::CliError;

pub const ENV_STREAM_CAPACITY: &str = "LOGBOARD_STREAM_CAPACITY";
pub const ENV_DEFAULT_RANGE: &str = "LOGBOARD_DEFAULT_RANGE";
pub const ENV_REFRESH_INTERVAL_SECS: &str = "LOGBOARD_REFRESH_INTERVAL_SECS";
pub const ENV_INGEST_INTERVAL_MS: &str = "LOGBOARD_INGEST_INTERVAL_MS";
pub const ENV_WARNING_SCORE: &str = "LOGBOARD_WARNING_SCORE";
pub const ENV_DANGER_SCORE: &str = "LOGBOARD_DANGER_SCORE";
pub const ENV_BUCKET_POLICY: &str = "LOGBOARD_BUCKET_POLICY";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Validated dashboard settings.
    pub settings: DashboardSettings,
    /// Explicit data directory; falls back to the platform default.
    pub data_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load settings from the process environment.
    pub fn from_env(data_dir: Option<PathBuf>) -> Result<Self, CliError> {
        Self::from_lookup(|name| env::var(name).ok(), data_dir)
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F, data_dir: Option<PathBuf>) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = DashboardSettings::with_defaults();

        if let Some(raw) = lookup(ENV_STREAM_CAPACITY) {
            settings.stream_capacity = parse_var(ENV_STREAM_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DEFAULT_RANGE) {
            settings.default_range = parse_var(ENV_DEFAULT_RANGE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_REFRESH_INTERVAL_SECS) {
            settings.refresh_interval_secs = parse_var(ENV_REFRESH_INTERVAL_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_INGEST_INTERVAL_MS) {
            settings.ingest_interval_ms = parse_var(ENV_INGEST_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_WARNING_SCORE) {
            settings.warning_score_threshold = parse_var(ENV_WARNING_SCORE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_DANGER_SCORE) {
            settings.danger_score_threshold = parse_var(ENV_DANGER_SCORE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BUCKET_POLICY) {
            settings.bucket_policy = parse_var(ENV_BUCKET_POLICY, &raw)?;
        }

        validate_settings(&settings)?;
        Ok(Self { settings, data_dir })
    }

    /// Apply a `--range` flag on top of the loaded default.
    #[must_use]
    pub fn with_range(mut self, range: Option<TimeRange>) -> Self {
        if let Some(range) = range {
            self.settings.default_range = range;
        }
        self
    }

    /// Resolve the SQLite database path.
    pub fn database_path(&self) -> Result<PathBuf, PathError> {
        match &self.data_dir {
            Some(dir) => database_path_in(dir),
            None => database_path(),
        }
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| CliError::Config(format!("{name}={raw}: {e}")))
}
