//! Main commands enum and primary subcommands.
//!
//! This module defines the available commands for the CLI tool.

use clap::Subcommand;
use logboard_core::{Column, LogKind, TimeRange};

use crate::status_commands::StatusCommand;

/// Available commands for the dashboard.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved paths and effective settings
    Paths,

    /// Read, change or watch board statuses
    Status {
        #[command(subcommand)]
        command: StatusCommand,
    },

    /// Run the mock ingestion and print live trend series and table
    Live {
        /// Chart time range: 1h, 6h or 12h (defaults to LOGBOARD_DEFAULT_RANGE)
        #[arg(long)]
        range: Option<TimeRange>,
        /// Log stream to display: app or web
        #[arg(long, default_value = "web")]
        kind: LogKind,
        /// Case-insensitive keyword matched against every column
        #[arg(long)]
        keyword: Option<String>,
        /// Exact-match column filter, repeatable (e.g. --filter method=GET)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(Column, String)>,
        /// Sort oldest first instead of newest first
        #[arg(long)]
        ascending: bool,
        /// Rows to print per table refresh
        #[arg(long, default_value_t = 10)]
        rows: usize,
        /// Print frames and snapshots as JSON lines
        #[arg(long)]
        json: bool,
        /// Stop after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },
}

/// Parse a `column=value` filter argument.
pub fn parse_filter(raw: &str) -> Result<(Column, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got `{raw}`"))?;
    let column = column.parse::<Column>().map_err(|e| e.to_string())?;
    Ok((column, value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("method=GET"),
            Ok((Column::Method, "GET".to_string()))
        );
        assert_eq!(
            parse_filter("user_agent=curl/8.4.0"),
            Ok((Column::UserAgent, "curl/8.4.0".to_string()))
        );
        assert_eq!(parse_filter("level="), Ok((Column::Level, String::new())));
        assert!(parse_filter("method").is_err());
        assert!(parse_filter("colour=red").is_err());
    }

    #[test]
    fn test_live_args() {
        let cli = Cli::parse_from([
            "logboard",
            "live",
            "--range",
            "6h",
            "--kind",
            "app",
            "--keyword",
            "timeout",
            "--filter",
            "level=ERROR",
            "--ascending",
            "--duration-secs",
            "5",
        ]);
        let Some(Commands::Live {
            range,
            kind,
            keyword,
            filters,
            ascending,
            rows,
            json,
            duration_secs,
        }) = cli.command
        else {
            panic!("expected live command");
        };
        assert_eq!(range, Some(TimeRange::SixHours));
        assert_eq!(kind, LogKind::App);
        assert_eq!(keyword.as_deref(), Some("timeout"));
        assert_eq!(filters, vec![(Column::Level, "ERROR".to_string())]);
        assert!(ascending);
        assert_eq!(rows, 10);
        assert!(!json);
        assert_eq!(duration_secs, Some(5));
    }

    #[test]
    fn test_status_args() {
        let cli = Cli::parse_from(["logboard", "status", "set", "7", "collecting"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                command: StatusCommand::Set {
                    board: 7,
                    status: logboard_core::BoardStatus::Collecting
                }
            })
        ));

        let cli = Cli::parse_from(["logboard", "status", "watch", "1", "2", "3"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                command: StatusCommand::Watch { ref boards, duration_secs: None }
            }) if boards == &[1, 2, 3]
        ));
    }

    #[test]
    fn test_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["logboard", "status", "set", "7", "maybe"]).is_err());
        assert!(Cli::try_parse_from(["logboard", "live", "--range", "2h"]).is_err());
    }
}
