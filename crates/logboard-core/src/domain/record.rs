//! Log record types for the application and web-access streams.
//!
//! Records are decoded leniently at the ingestion boundary: a record is never
//! rejected, missing or mistyped text fields become `""` and missing or
//! mistyped integers become `None`. Absent values render as `""` in tables.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DomainParseError;
use super::column::Column;

/// Timestamp layouts accepted for naive (zone-less) wall-clock timestamps.
///
/// `%.f` also matches an absent fractional part.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Upper bound of the anomaly score carried by web records.
const MAX_AI_SCORE: u64 = 100;

/// The two live log streams of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// Application logs (level / logger / message).
    App,
    /// Web-access logs (HTTP request lines with an anomaly score).
    Web,
}

impl LogKind {
    /// Both kinds, in display order.
    pub const ALL: [Self; 2] = [Self::App, Self::Web];

    /// Wire name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = DomainParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "app" => Ok(Self::App),
            "web" => Ok(Self::Web),
            _ => Err(DomainParseError::UnknownKind(s.to_string())),
        }
    }
}

/// A single application log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppLogRecord {
    /// Second-precision timestamp as emitted by the agent.
    pub timestamp: String,
    /// Log level; usually INFO / WARN / ERROR but not restricted.
    pub level: String,
    /// Logger name.
    pub logger: String,
    /// Free-text message.
    pub message: String,
}

/// A single web-access log line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebLogRecord {
    pub timestamp: String,
    pub method: String,
    pub protocol: String,
    /// Response size in bytes.
    pub size: Option<u64>,
    pub path: String,
    /// HTTP status code.
    pub status: Option<u16>,
    pub referrer: String,
    pub user_agent: String,
    pub ip: String,
    /// Anomaly score in `0..=100`.
    pub ai_score: Option<u8>,
}

/// A record from either stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord {
    App(AppLogRecord),
    Web(WebLogRecord),
}

impl LogRecord {
    /// Decode a raw ingestion payload of the given kind.
    ///
    /// Never fails: non-object payloads decode to an all-default record.
    pub fn from_json(kind: LogKind, raw: &Value) -> Self {
        match kind {
            LogKind::App => Self::App(AppLogRecord {
                timestamp: text_field(raw, "timestamp"),
                level: text_field(raw, "level"),
                logger: text_field(raw, "logger"),
                message: text_field(raw, "message"),
            }),
            LogKind::Web => Self::Web(WebLogRecord {
                timestamp: text_field(raw, "timestamp"),
                method: text_field(raw, "method"),
                protocol: text_field(raw, "protocol"),
                size: integer_field(raw, "size"),
                path: text_field(raw, "path"),
                status: integer_field(raw, "status").and_then(|n| u16::try_from(n).ok()),
                referrer: text_field(raw, "referrer"),
                user_agent: text_field(raw, "userAgent"),
                ip: text_field(raw, "ip"),
                ai_score: integer_field(raw, "aiScore")
                    .and_then(|n| u8::try_from(n.min(MAX_AI_SCORE)).ok()),
            }),
        }
    }

    /// Which stream this record belongs to.
    pub const fn kind(&self) -> LogKind {
        match self {
            Self::App(_) => LogKind::App,
            Self::Web(_) => LogKind::Web,
        }
    }

    /// The raw timestamp string.
    pub fn timestamp(&self) -> &str {
        match self {
            Self::App(r) => &r.timestamp,
            Self::Web(r) => &r.timestamp,
        }
    }

    /// The timestamp as local wall-clock time, if it parses.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(self.timestamp())
    }

    /// Column value rendered as a string.
    ///
    /// Columns that do not belong to this record's kind render as `""`.
    pub fn value(&self, column: Column) -> String {
        match (self, column) {
            (_, Column::Timestamp) => self.timestamp().to_string(),
            (Self::App(r), Column::Level) => r.level.clone(),
            (Self::App(r), Column::Logger) => r.logger.clone(),
            (Self::App(r), Column::Message) => r.message.clone(),
            (Self::Web(r), Column::Method) => r.method.clone(),
            (Self::Web(r), Column::Protocol) => r.protocol.clone(),
            (Self::Web(r), Column::Size) => optional(r.size),
            (Self::Web(r), Column::Path) => r.path.clone(),
            (Self::Web(r), Column::Status) => optional(r.status),
            (Self::Web(r), Column::Referrer) => r.referrer.clone(),
            (Self::Web(r), Column::UserAgent) => r.user_agent.clone(),
            (Self::Web(r), Column::Ip) => r.ip.clone(),
            (Self::Web(r), Column::AiScore) => optional(r.ai_score),
            _ => String::new(),
        }
    }

    /// All column values of this record, in column order.
    pub fn values(&self) -> impl Iterator<Item = String> + '_ {
        Column::for_kind(self.kind())
            .iter()
            .map(move |column| self.value(*column))
    }
}

impl From<AppLogRecord> for LogRecord {
    fn from(record: AppLogRecord) -> Self {
        Self::App(record)
    }
}

impl From<WebLogRecord> for LogRecord {
    fn from(record: WebLogRecord) -> Self {
        Self::Web(record)
    }
}

/// Parse an agent timestamp into local wall-clock time.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the `T`-separated form, optional fractional
/// seconds, and RFC 3339 with an offset. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Local).naive_local())
        })
}

fn text_field(raw: &Value, name: &str) -> String {
    match raw.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn integer_field(raw: &Value, name: &str) -> Option<u64> {
    match raw.get(name) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_decode_complete_app_record() {
        let raw = json!({
            "timestamp": "2024-05-01 10:00:00",
            "level": "ERROR",
            "logger": "auth",
            "message": "token expired"
        });
        let record = LogRecord::from_json(LogKind::App, &raw);
        assert_eq!(
            record,
            LogRecord::App(AppLogRecord {
                timestamp: "2024-05-01 10:00:00".to_string(),
                level: "ERROR".to_string(),
                logger: "auth".to_string(),
                message: "token expired".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let record = LogRecord::from_json(LogKind::Web, &json!({ "path": "/health" }));
        let LogRecord::Web(web) = record else {
            panic!("expected web record");
        };
        assert_eq!(web.path, "/health");
        assert_eq!(web.method, "");
        assert_eq!(web.status, None);
        assert_eq!(web.ai_score, None);
    }

    #[test]
    fn test_absent_numbers_render_empty() {
        let raw = json!({ "status": "n/a", "size": -5 });
        let record = LogRecord::from_json(LogKind::Web, &raw);
        assert_eq!(record.value(Column::Status), "");
        assert_eq!(record.value(Column::Size), "");
        assert_eq!(record.value(Column::AiScore), "");
        assert!(!record.values().any(|v| v == "0"));
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = json!({ "status": "404", "size": 512, "aiScore": "87" });
        let LogRecord::Web(web) = LogRecord::from_json(LogKind::Web, &raw) else {
            panic!("expected web record");
        };
        assert_eq!(web.status, Some(404));
        assert_eq!(web.size, Some(512));
        assert_eq!(web.ai_score, Some(87));
    }

    #[test]
    fn test_ai_score_is_clamped() {
        let raw = json!({ "aiScore": 250 });
        let LogRecord::Web(web) = LogRecord::from_json(LogKind::Web, &raw) else {
            panic!("expected web record");
        };
        assert_eq!(web.ai_score, Some(100));
    }

    #[test]
    fn test_non_object_payload_decodes_to_default() {
        let record = LogRecord::from_json(LogKind::App, &json!("garbage"));
        assert_eq!(record, LogRecord::App(AppLogRecord::default()));
    }

    #[test]
    fn test_value_for_foreign_column_is_empty() {
        let record = LogRecord::from(AppLogRecord {
            level: "INFO".to_string(),
            ..Default::default()
        });
        assert_eq!(record.value(Column::Level), "INFO");
        assert_eq!(record.value(Column::Status), "");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 30, 15)
            .unwrap();
        assert_eq!(parse_timestamp("2024-05-01 10:30:15"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:30:15"), Some(expected));
        assert_eq!(parse_timestamp("2024/05/01 10:30:15"), Some(expected));
        assert!(parse_timestamp("2024-05-01T10:30:15.250").is_some());
        assert!(parse_timestamp("2024-05-01T10:30:15+09:00").is_some());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("10:30"), None);
    }

    #[test]
    fn test_record_serialization_is_tagged() {
        let record = LogRecord::from(WebLogRecord {
            user_agent: "curl".to_string(),
            ai_score: Some(12),
            ..Default::default()
        });
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"web\""));
        assert!(json.contains("\"userAgent\":\"curl\""));
        assert!(json.contains("\"aiScore\":12"));
    }
}
