//! Named record fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainParseError;
use super::record::LogKind;

/// A field of a log record, addressable by name from tables and filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    Timestamp,
    Level,
    Logger,
    Message,
    Method,
    Protocol,
    Size,
    Path,
    Status,
    Referrer,
    UserAgent,
    Ip,
    AiScore,
}

impl Column {
    /// Columns of an application log record.
    pub const APP: [Self; 4] = [Self::Timestamp, Self::Level, Self::Logger, Self::Message];

    /// Columns of a web-access log record.
    pub const WEB: [Self; 10] = [
        Self::Timestamp,
        Self::Method,
        Self::Protocol,
        Self::Size,
        Self::Path,
        Self::Status,
        Self::Referrer,
        Self::UserAgent,
        Self::Ip,
        Self::AiScore,
    ];

    /// Columns that exist on records of `kind`.
    pub const fn for_kind(kind: LogKind) -> &'static [Self] {
        match kind {
            LogKind::App => &Self::APP,
            LogKind::Web => &Self::WEB,
        }
    }

    /// Wire name (camelCase, matching the record field names).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Level => "level",
            Self::Logger => "logger",
            Self::Message => "message",
            Self::Method => "method",
            Self::Protocol => "protocol",
            Self::Size => "size",
            Self::Path => "path",
            Self::Status => "status",
            Self::Referrer => "referrer",
            Self::UserAgent => "userAgent",
            Self::Ip => "ip",
            Self::AiScore => "aiScore",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = DomainParseError;

    /// Accepts the camelCase wire name or its snake_case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('_', "").to_ascii_lowercase();
        Self::APP
            .iter()
            .chain(Self::WEB.iter())
            .copied()
            .find(|column| column.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| DomainParseError::UnknownColumn(s.to_string()))
    }
}
