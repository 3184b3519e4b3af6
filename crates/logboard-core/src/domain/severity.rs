//! Abnormal-record classification for trend charts.

use serde::{Deserialize, Serialize};

use super::record::LogRecord;

/// How abnormal a record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Danger,
}

impl Severity {
    pub const fn is_abnormal(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Anomaly-score cut-offs for web records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    /// Scores at or above this are `Warning`.
    pub warning: u8,
    /// Scores at or above this are `Danger`.
    pub danger: u8,
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            warning: 50,
            danger: 80,
        }
    }
}

impl SeverityThresholds {
    /// Classify a record.
    ///
    /// App records classify by level (`WARN`, `ERROR`, case-insensitive);
    /// web records by `aiScore`. A web record without a score is normal.
    pub fn classify(&self, record: &LogRecord) -> Severity {
        match record {
            LogRecord::App(app) => match app.level.trim().to_ascii_uppercase().as_str() {
                "ERROR" => Severity::Danger,
                "WARN" | "WARNING" => Severity::Warning,
                _ => Severity::Normal,
            },
            LogRecord::Web(web) => match web.ai_score {
                Some(score) if score >= self.danger => Severity::Danger,
                Some(score) if score >= self.warning => Severity::Warning,
                _ => Severity::Normal,
            },
        }
    }
}
