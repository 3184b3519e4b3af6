//! Board status subcommands.

use clap::Subcommand;
use logboard_core::{BoardId, BoardStatus};

/// Board status commands.
#[derive(Subcommand)]
pub enum StatusCommand {
    /// Show a board's status (an unseen board is recorded as unresponsive)
    Get {
        /// Board identifier
        board: BoardId,
    },
    /// Set a board's status explicitly
    Set {
        /// Board identifier
        board: BoardId,
        /// New status: collecting, unresponsive or before
        status: BoardStatus,
    },
    /// Apply a status label as reported by the board service
    Apply {
        /// Board identifier
        board: BoardId,
        /// Server label, e.g. "수집 중" or "미응답"
        label: String,
    },
    /// Flip a board between collecting and unresponsive
    Toggle {
        /// Board identifier
        board: BoardId,
    },
    /// Print status changes from this and other processes until interrupted
    Watch {
        /// Boards to summarize as a folder (omit to print every change)
        boards: Vec<BoardId>,
        /// Stop after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },
}
