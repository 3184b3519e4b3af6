//! Shared CLI presentation utilities.
//!
//! This module provides reusable display and formatting functions
//! for consistent CLI output across commands.
//!
//! # Guidelines
//!
//! - Keep this module format-only: no domain transforms
//! - Filtering, sorting and bucketing belong in logboard-core

pub mod live_display;
pub mod tables;

// Re-export commonly used items
pub use live_display::{format_badge, format_series, format_table};
pub use tables::{print_separator, sparkline, truncate_string};
