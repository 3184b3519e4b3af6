//! Async adapters driving the logboard engine.
//!
//! - [`ingest`] - mock ingestion feeding the stream store on a fixed cadence
//! - [`series`] - trend series recomputed on change and on a timer
//! - [`table_watch`] - live table snapshots recomputed on change
//!
//! Every task takes a `CancellationToken` and stops promptly once it fires.
#![deny(unsafe_code)]

pub mod ingest;
pub mod series;
pub mod table_watch;

pub use ingest::{MockLogGenerator, MockRecordFactory};
pub use series::{SeriesFrame, SeriesTicker};
pub use table_watch::{TableSnapshot, TableWatcher};
