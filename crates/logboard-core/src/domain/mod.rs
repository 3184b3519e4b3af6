//! Domain types for the live-log dashboard.
//!
//! These are pure data types with no infrastructure dependencies:
//!
//! - `record` - the two log record kinds and the lenient ingestion decoder
//! - `column` - named record fields used by tables and filters
//! - `status` - canonical board collection status and its storage key scheme
//! - `severity` - abnormal-record classification used by trend charts

mod column;
mod record;
mod severity;
mod status;

use thiserror::Error;

pub use column::Column;
pub use record::{AppLogRecord, LogKind, LogRecord, WebLogRecord, parse_timestamp};
pub use severity::{Severity, SeverityThresholds};
pub use status::{
    BadgeColor, BoardId, BoardStatus, STATUS_KEY_PREFIX, StatusBadge, board_id_from_key,
    status_key,
};

/// Error returned when a user-supplied name does not map to a domain value.
///
/// Only raised by the strict `FromStr` implementations used at the CLI/config
/// edge. Ingestion and persisted values go through lenient decoders instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainParseError {
    #[error("Unknown log kind: {0} (expected \"app\" or \"web\")")]
    UnknownKind(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Unknown board status: {0} (expected collecting, unresponsive or before)")]
    UnknownStatus(String),

    #[error("Unknown time range: {0} (expected 1h, 6h or 12h)")]
    UnknownRange(String),

    #[error("Unknown bucket policy: {0} (expected boundary or nearest_label)")]
    UnknownPolicy(String),
}
