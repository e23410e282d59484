//! Cached query service over the snapshot reader
//!
//! Serves history queries from the on-disk cache when a fresh entry exists,
//! and falls back to a snapshot read (repopulating the cache) when it does
//! not. `refresh` forces the fallback path by evicting first.

use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::history::record::{QueryWindow, VisitRecord};
use crate::history::snapshot::SnapshotSource;
use crate::history::HistoryError;

/// Cache key for the most recent query result.
///
/// Known limitation, kept for compatibility with existing cache state: the
/// key does not vary with the query window. A fresh entry cached for one
/// window is returned unmodified for a different window until it expires or
/// the caller passes `--refresh`.
pub const HISTORY_CACHE_KEY: &str = "edge_history";

/// Default time-to-live for cached query results
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(300);

/// History queries with TTL-cached results
pub struct HistoryQueryService<S: SnapshotSource> {
    cache: CacheStore,
    source: S,
    ttl: Duration,
}

impl<S: SnapshotSource> HistoryQueryService<S> {
    /// Creates a service caching `source` reads for `ttl`
    pub fn new(cache: CacheStore, source: S, ttl: Duration) -> Self {
        Self { cache, source, ttl }
    }

    /// Returns cached records if fresh, else snapshots and repopulates
    ///
    /// A failure to write the cache entry is logged and otherwise ignored;
    /// the freshly read records are still returned.
    pub fn load(&self, window: &QueryWindow) -> Result<Vec<VisitRecord>, HistoryError> {
        if let Some(records) = self.cache.get::<Vec<VisitRecord>>(HISTORY_CACHE_KEY) {
            debug!(count = records.len(), "serving history from cache");
            return Ok(records);
        }

        let records = self.source.read(window)?;
        if let Err(e) = self
            .cache
            .set(HISTORY_CACHE_KEY, &records, Some(self.ttl))
        {
            warn!(error = %e, "failed to cache history result");
        }
        Ok(records)
    }

    /// Evicts any cached result, then loads
    ///
    /// Always performs exactly one snapshot read.
    pub fn refresh(&self, window: &QueryWindow) -> Result<Vec<VisitRecord>, HistoryError> {
        self.cache.evict(HISTORY_CACHE_KEY);
        self.load(window)
    }
}
