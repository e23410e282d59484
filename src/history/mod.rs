//! Browser history querying through cached snapshots
//!
//! The live history database belongs to the browser and stays locked while
//! it runs. This module reads it by snapshot: copy the file, query the
//! copy, throw the copy away. Results are cached on disk with a TTL so
//! repeated invocations within the window skip the copy entirely.

pub mod export;
pub mod record;
pub mod service;
pub mod snapshot;

pub use export::{ExportError, ExportFormat};
pub use record::{QueryWindow, VisitRecord, WindowParseError};
pub use service::HistoryQueryService;
pub use snapshot::{SnapshotReader, SnapshotSource};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the snapshot and query pipeline
///
/// All three variants are fatal to the current invocation; there are no
/// partial results. Cache-layer problems never surface here, they degrade
/// to a miss inside the service.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The live database is missing or unreadable
    #[error("History database unavailable at {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The working copy could not be created, written, or removed
    #[error("Snapshot workspace error: {0}")]
    Workspace(#[source] std::io::Error),

    /// The copy is not a readable history database
    #[error("History query failed: {0}")]
    Query(#[from] rusqlite::Error),
}
