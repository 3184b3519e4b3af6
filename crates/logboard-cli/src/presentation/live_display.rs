//! Rendering of live series frames, table snapshots and status badges.

use std::fmt::Write as _;

use logboard_core::{BoardId, Column, LogKind, StatusBadge};
use logboard_runtime::{SeriesFrame, TableSnapshot};

use super::tables::{sparkline, truncate_string};

const fn column_width(column: Column) -> usize {
    match column {
        Column::Timestamp => 19,
        Column::Message => 40,
        Column::Logger => 28,
        Column::UserAgent => 24,
        Column::Path | Column::Referrer => 20,
        Column::Ip => 15,
        Column::Level | Column::Method | Column::Protocol => 8,
        Column::Size | Column::Status | Column::AiScore => 7,
    }
}

/// One-line summary of a series frame.
///
/// Shows the total and abnormal sparklines from the first to the last
/// bucket label, followed by the counts of the newest bucket.
pub fn format_series(frame: &SeriesFrame) -> String {
    let totals: Vec<usize> = frame.total.iter().map(|p| p.value).collect();
    let abnormal: Vec<usize> = frame
        .abnormal
        .iter()
        .map(|p| p.warning + p.danger)
        .collect();
    let first = frame.total.first().map_or("--:--", |p| p.time.as_str());
    let last = frame.total.last().map_or("--:--", |p| p.time.as_str());
    let (warning, danger) = frame
        .abnormal
        .last()
        .map_or((0, 0), |p| (p.warning, p.danger));

    format!(
        "[{kind}] {first} {total} {last}  now {count} | abnormal {spark} warn {warning} danger {danger}",
        kind = frame.kind,
        total = sparkline(&totals),
        count = totals.last().copied().unwrap_or(0),
        spark = sparkline(&abnormal),
    )
}

/// Render up to `limit` visible rows with a header and the filter choices.
pub fn format_table(kind: LogKind, snapshot: &TableSnapshot, limit: usize) -> String {
    let columns = Column::for_kind(kind);
    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .map(|&c| format!("{:<width$}", c.as_str(), width = column_width(c)))
        .collect();
    let _ = writeln!(out, "{}", header.join(" ").trim_end());

    for record in snapshot.rows.iter().take(limit) {
        let cells: Vec<String> = columns
            .iter()
            .map(|&c| {
                let width = column_width(c);
                format!("{:<width$}", truncate_string(&record.value(c), width))
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join(" ").trim_end());
    }

    if snapshot.rows.len() > limit {
        let _ = writeln!(out, "... {} more", snapshot.rows.len() - limit);
    }

    for (column, values) in &snapshot.distinct {
        let _ = writeln!(out, "{column}: {}", values.join(", "));
    }
    out
}

/// `board  label` line for a status badge.
pub fn format_badge(board_id: BoardId, badge: StatusBadge) -> String {
    format!("{board_id:>8}  {}", badge.label)
}
