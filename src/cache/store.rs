//! On-disk key/value store with per-entry TTL
//!
//! Provides a `CacheStore` that persists serializable values to JSON files,
//! one file per key, with an optional expiry timestamp per entry. Entries
//! survive process exit so short-lived CLI invocations can share state.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the entry expires; `None` means it never expires
    expires_at: Option<DateTime<Utc>>,
}

/// Key/value store backed by JSON files in a cache directory
///
/// Expiry is lazy: it is checked only when a key is read, never by a
/// background sweeper. A `get` that finds an expired entry treats it as a
/// miss and removes the file. Unreadable or corrupt entry files are also
/// treated as misses, never as errors, so a damaged cache degrades to a
/// fresh load instead of aborting the tool.
///
/// Concurrent invocations writing the same key race with last-writer-wins
/// semantics; no locking is provided.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheStore {
    /// Creates a new CacheStore using the XDG-compliant cache directory
    ///
    /// Uses `~/.cache/edgetools/` on Linux, or the equivalent path on other
    /// platforms. Returns `None` if the cache directory cannot be determined
    /// (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "edgetools")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheStore with a custom cache directory
    ///
    /// Useful for testing or when a specific cache location is needed.
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory holding the cache files
    ///
    /// Also used as the working directory for history snapshot copies so the
    /// copy stays on the same filesystem as the rest of the tool's state.
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file for the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Stores a value under `key` with an optional time-to-live
    ///
    /// `ttl = None` stores the value without an expiry. Writing to an
    /// existing key replaces both the value and its expiry.
    pub fn set<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl: Option<Duration>,
    ) -> std::io::Result<()> {
        self.ensure_dir()?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: ttl
                .and_then(|t| chrono::Duration::from_std(t).ok())
                .map(|d| now + d),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        debug!(key, ttl_secs = ttl.map(|t| t.as_secs()), "cache set");
        fs::write(self.entry_path(key), json)
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `None` when the key is absent, the entry has expired, or the
    /// entry file cannot be parsed. Expired entries are removed on read;
    /// corrupt entries are reported at warn level and left for the next
    /// `set` to overwrite.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.entry_path(key);
        let content = fs::read_to_string(&path).ok()?;

        let entry: CacheEntry<T> = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "unreadable cache entry, treating as miss");
                return None;
            }
        };

        if let Some(expires_at) = entry.expires_at {
            if Utc::now() > expires_at {
                debug!(key, "cache entry expired");
                let _ = fs::remove_file(&path);
                return None;
            }
        }

        Some(entry.data)
    }

    /// Removes the entry for `key` immediately, regardless of expiry
    ///
    /// Evicting an absent key is not an error.
    pub fn evict(&self, key: &str) {
        debug!(key, "cache evict");
        let _ = fs::remove_file(self.entry_path(key));
    }
}
