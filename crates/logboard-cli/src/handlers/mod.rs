//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call core services and runtime adapters
//!   3. Format output for the terminal
//!
//! Handlers should NOT:
//! - Access the database pool directly
//! - Contain filtering, bucketing or status normalization logic

pub mod live;
pub mod paths;
pub mod status;

use std::time::Duration;

use tracing::{debug, warn};

/// Resolve on Ctrl-C, or once `limit` has elapsed when one is given.
pub(crate) async fn interrupted(limit: Option<Duration>) {
    let deadline = async {
        match limit {
            Some(limit) => tokio::time::sleep(limit).await,
            None => std::future::pending().await,
        }
    };
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => debug!("Interrupted"),
        () = deadline => debug!("Duration elapsed"),
    }
}
