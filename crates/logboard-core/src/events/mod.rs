//! Canonical event union for dashboard events.
//!
//! This module is the single source of truth for events broadcast inside a
//! sync context (status changes) and emitted by the stream store.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag and camelCase payload fields:
//!
//! ```json
//! { "type": "status_changed", "boardId": 7, "statusType": "collecting" }
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::{BoardId, BoardStatus, LogKind};

/// Canonical dashboard events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    // ========== Status Events ==========
    /// A board's collection status was written in this context.
    StatusChanged {
        /// Board whose status changed.
        #[serde(rename = "boardId")]
        board_id: BoardId,
        /// New canonical status.
        #[serde(rename = "statusType")]
        status_type: BoardStatus,
    },

    // ========== Stream Events ==========
    /// A record was appended to one of the live buffers.
    RecordAppended {
        /// Stream that received the record.
        kind: LogKind,
    },

    /// Both live buffers were cleared.
    StreamReset,
}

impl BoardEvent {
    /// Create a status changed event.
    pub const fn status_changed(board_id: BoardId, status_type: BoardStatus) -> Self {
        Self::StatusChanged {
            board_id,
            status_type,
        }
    }

    /// Get the event name for wire protocols.
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::StatusChanged { .. } => "board:status_changed",
            Self::RecordAppended { .. } => "stream:record_appended",
            Self::StreamReset => "stream:reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_event_serialization() {
        let event = BoardEvent::status_changed(7, BoardStatus::Collecting);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"status_changed\""));
        assert!(json.contains("\"boardId\":7"));
        assert!(json.contains("\"statusType\":\"collecting\""));
    }

    #[test]
    fn test_event_names_are_stable() {
        let cases = vec![
            (
                BoardEvent::status_changed(1, BoardStatus::Before),
                "board:status_changed",
            ),
            (
                BoardEvent::RecordAppended { kind: LogKind::Web },
                "stream:record_appended",
            ),
            (BoardEvent::StreamReset, "stream:reset"),
        ];

        for (event, expected_name) in cases {
            assert_eq!(event.event_name(), expected_name);
        }
    }

    #[test]
    fn test_status_event_round_trips_from_wire() {
        let event: BoardEvent =
            serde_json::from_str(r#"{"type":"status_changed","boardId":3,"statusType":"before"}"#)
                .unwrap();
        assert_eq!(event, BoardEvent::status_changed(3, BoardStatus::Before));
    }
}
