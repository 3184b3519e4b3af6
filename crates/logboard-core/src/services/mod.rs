//! Core services.
//!
//! Services depend only on ports and domain types; adapters inject the
//! store implementation.

mod folder_status;
mod status_sync;

pub use folder_status::{FolderStatusView, StatusCounts};
pub use status_sync::{DeliveryScope, StatusNotification, StatusSubscription, StatusSyncChannel};
