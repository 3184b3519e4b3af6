//! Core domain, ports and engine for the logboard live-log dashboard.
//!
//! - [`stream`] - bounded per-kind record buffers with synchronous listeners
//! - [`services`] - board status synchronization across sync contexts
//! - [`aggregate`] - fixed-bucket trend series anchored to "now"
//! - [`table`] - keyword/equality filtering and timestamp sorting
//!
//! Storage and timers live in adapter crates; this crate has no I/O beyond
//! data-directory resolution in [`paths`].
#![deny(unused_crate_dependencies)]

pub mod aggregate;
pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;
pub mod stream;
pub mod table;

// Re-export commonly used types for convenience
pub use aggregate::{
    BUCKET_COUNT, BucketPolicy, SeriesPoint, SplitSeriesPoint, TimeBucket, TimeRange,
    TimeWindowAggregator,
};
pub use domain::{
    AppLogRecord, BadgeColor, BoardId, BoardStatus, Column, DomainParseError, LogKind, LogRecord,
    Severity, SeverityThresholds, StatusBadge, WebLogRecord,
};
pub use events::BoardEvent;
pub use ports::{
    Clock, ContextId, CoreError, FixedClock, KeyValueStore, MemoryKeyValueStore, RepositoryError,
    StorageChange, SystemClock,
};
pub use services::{
    DeliveryScope, FolderStatusView, StatusCounts, StatusNotification, StatusSubscription,
    StatusSyncChannel,
};
pub use settings::{DashboardSettings, SettingsError, validate_settings};
pub use stream::{DEFAULT_STREAM_CAPACITY, LogStreamStore, StreamMetrics, StreamSubscription};
pub use table::{DistinctValues, FilterState, LiveTable, SortDirection};

// Re-export path utilities
pub use paths::{PathError, data_root, database_path, database_path_in};
