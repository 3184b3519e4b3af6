//! Path utilities for logboard data directories.
//!
//! Returns `PathBuf` and `PathError`; no interactive I/O.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "LOGBOARD_DATA_DIR";

/// File name of the shared status database.
pub const DATABASE_FILE_NAME: &str = "logboard.db";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `LOGBOARD_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/logboard`)
///
/// The directory is created if it doesn't exist.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var(DATA_DIR_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("logboard"),
    };

    ensure_dir(&root)?;
    Ok(root)
}

/// Get the path to the status database under an explicit root.
pub fn database_path_in(root: &Path) -> Result<PathBuf, PathError> {
    if root.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }

    let data_dir = root.join("data");
    ensure_dir(&data_dir)?;
    Ok(data_dir.join(DATABASE_FILE_NAME))
}

/// Get the path to the status database under [`data_root`].
pub fn database_path() -> Result<PathBuf, PathError> {
    database_path_in(&data_root()?)
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
