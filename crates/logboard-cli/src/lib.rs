//! Command-line adapter for logboard.
//!
//! The binary in `main.rs` is the composition root; this library holds the
//! parser, bootstrap and handlers so they can be tested.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;
pub mod status_commands;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap};
pub use commands::Commands;
pub use config::CliConfig;
pub use error::CliError;
pub use parser::Cli;
pub use status_commands::StatusCommand;
