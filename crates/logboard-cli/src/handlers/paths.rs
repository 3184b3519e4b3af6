//! Paths command handler.
//!
//! Displays resolved paths and effective settings for diagnostics.

use anyhow::Result;

use crate::bootstrap::CliContext;

/// Execute the paths command.
///
/// Prints `key = value` lines for the database location, this process's
/// sync context and every effective setting.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let settings = &ctx.settings;
    let data_dir = ctx
        .database_path
        .parent()
        .map_or_else(|| "-".to_string(), |dir| dir.display().to_string());

    println!("data_dir = {data_dir}");
    println!("database = {}", ctx.database_path.display());
    println!("context_id = {}", ctx.status.context_id());
    println!("stream_capacity = {}", settings.stream_capacity);
    println!("default_range = {}", settings.default_range);
    println!("refresh_interval_secs = {}", settings.refresh_interval_secs);
    println!("ingest_interval_ms = {}", settings.ingest_interval_ms);
    println!(
        "score_thresholds = warning >= {}, danger >= {}",
        settings.warning_score_threshold, settings.danger_score_threshold
    );
    println!("bucket_policy = {}", settings.bucket_policy);
    Ok(())
}
