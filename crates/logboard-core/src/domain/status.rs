//! Board collection status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DomainParseError;

/// Numeric board identifier as assigned by the board service.
pub type BoardId = i64;

/// Prefix of every status key in the shared key-value store.
pub const STATUS_KEY_PREFIX: &str = "statusType-";

/// Server label fragment meaning "not responding".
const SERVER_LABEL_UNRESPONSIVE: &str = "미응답";

/// Server label fragment meaning "collecting".
const SERVER_LABEL_COLLECTING: &str = "수집";

/// Canonical collection status of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardStatus {
    /// The agent is delivering logs.
    Collecting,
    /// The agent has stopped responding. Default for unseen boards.
    #[default]
    Unresponsive,
    /// The board was never configured.
    Before,
}

impl BoardStatus {
    /// Canonical wire value, as persisted under `statusType-{boardId}`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Unresponsive => "unresponsive",
            Self::Before => "before",
        }
    }

    /// Normalize a value read back from the shared store.
    ///
    /// The historical alias `collection` maps to `Collecting`, an empty value
    /// means the board was never configured, and anything unrecognised is
    /// treated as `Unresponsive`.
    pub fn parse_persisted(raw: &str) -> Self {
        match raw.trim() {
            "collecting" | "collection" => Self::Collecting,
            "unresponsive" => Self::Unresponsive,
            "before" | "" => Self::Before,
            _ => Self::Unresponsive,
        }
    }

    /// Map a server-reported status label by substring.
    ///
    /// A label carrying both fragments maps to `Unresponsive`.
    pub fn from_server_label(label: &str) -> Self {
        if label.contains(SERVER_LABEL_UNRESPONSIVE) {
            Self::Unresponsive
        } else if label.contains(SERVER_LABEL_COLLECTING) {
            Self::Collecting
        } else {
            Self::Unresponsive
        }
    }

    /// Next value for a manual override toggle.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Collecting => Self::Unresponsive,
            Self::Unresponsive | Self::Before => Self::Collecting,
        }
    }

    /// Presentation badge derived from the status.
    pub const fn badge(self) -> StatusBadge {
        match self {
            Self::Collecting => StatusBadge {
                label: "Collecting",
                color: BadgeColor::Green,
            },
            Self::Unresponsive => StatusBadge {
                label: "Unresponsive",
                color: BadgeColor::Red,
            },
            Self::Before => StatusBadge {
                label: "Not configured",
                color: BadgeColor::Gray,
            },
        }
    }
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoardStatus {
    type Err = DomainParseError;

    /// Strict parse for user input; unlike `parse_persisted` this rejects
    /// unknown values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collecting" | "collection" => Ok(Self::Collecting),
            "unresponsive" => Ok(Self::Unresponsive),
            "before" => Ok(Self::Before),
            _ => Err(DomainParseError::UnknownStatus(s.to_string())),
        }
    }
}

/// Badge color for a status tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Green,
    Red,
    Gray,
}

/// Derived status badge shown on board and folder tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub color: BadgeColor,
}

/// Store key holding the status of `board_id`.
pub fn status_key(board_id: BoardId) -> String {
    format!("{STATUS_KEY_PREFIX}{board_id}")
}

/// Extract the board id from a status key.
///
/// Returns `None` for keys outside the status namespace or with a
/// non-numeric suffix.
pub fn board_id_from_key(key: &str) -> Option<BoardId> {
    key.strip_prefix(STATUS_KEY_PREFIX)?.parse().ok()
}
