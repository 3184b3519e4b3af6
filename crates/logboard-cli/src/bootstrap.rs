//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - SQLite key-value store and its change poller (via logboard-db)
//! - Status sync channel and stream store (via logboard-core)
//!
//! Command handlers receive the composed [`CliContext`]. Runtime tasks
//! (generator, tickers) are started by the handlers that need them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use logboard_core::{Clock, DashboardSettings, LogStreamStore, StatusSyncChannel, SystemClock};
use logboard_db::{DEFAULT_POLL_INTERVAL, SqliteKeyValueStore, setup_database};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::CliConfig;
use crate::error::CliError;

/// Age after which entries in the change log are pruned on startup.
const CHANGE_LOG_RETENTION_HOURS: i64 = 24;

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Validated dashboard settings.
    pub settings: DashboardSettings,
    /// Resolved SQLite database file.
    pub database_path: PathBuf,
    /// Shared key-value store backing board statuses.
    pub store: Arc<SqliteKeyValueStore>,
    /// This process's status sync context.
    pub status: Arc<StatusSyncChannel>,
    /// In-memory record buffers for live views.
    pub stream: LogStreamStore,
    /// Wall clock used for record stamping and window anchoring.
    pub clock: Arc<dyn Clock>,
    /// Root token; every background task derives from it.
    pub cancel_token: CancellationToken,
    poller: JoinHandle<()>,
}

impl CliContext {
    /// Stop background tasks and wait for the change poller to exit.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.poller.await {
            warn!(error = %e, "Change poller did not shut down cleanly");
        }
        debug!("CLI context shut down");
    }
}

/// Bootstrap the CLI context with all dependencies wired.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or the
/// database fails to open.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let database_path = config.database_path().map_err(CliError::from)?;
    let pool = setup_database(&database_path)
        .await
        .map_err(|e| CliError::Database(format!("{}: {e:#}", database_path.display())))?;
    let store = Arc::new(
        SqliteKeyValueStore::open(pool)
            .await
            .map_err(|e| CliError::Database(e.to_string()))?,
    );

    match store
        .prune_changes(chrono::Duration::hours(CHANGE_LOG_RETENTION_HOURS))
        .await
    {
        Ok(0) => {}
        Ok(pruned) => debug!(pruned, "Pruned change log"),
        Err(e) => warn!(error = %e, "Failed to prune change log"),
    }

    let cancel_token = CancellationToken::new();
    let poller = store.spawn_change_poller(DEFAULT_POLL_INTERVAL, cancel_token.child_token());
    let status = Arc::new(StatusSyncChannel::new(store.clone()));

    info!(
        path = %database_path.display(),
        context = %status.context_id(),
        "Status store ready"
    );

    Ok(CliContext {
        stream: LogStreamStore::new(config.settings.stream_capacity),
        settings: config.settings,
        database_path,
        store,
        status,
        clock: Arc::new(SystemClock),
        cancel_token,
        poller,
    })
}
