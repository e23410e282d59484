//! Snapshot-isolated reads of the live history database
//!
//! The browser keeps its history database locked while it is running. To
//! query it without contending for that lock, the reader copies the file
//! byte-for-byte into a private working directory, runs the query against
//! the copy, and removes the copy before returning. The live file is only
//! ever opened read-only, and only for the duration of the raw copy.

use rusqlite::{Connection, OpenFlags};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::history::record::{
    duration_secs_from_micros, local_from_webkit, unix_secs_from_local, QueryWindow, VisitRecord,
};
use crate::history::HistoryError;

/// Join over the `urls` and `visits` tables, filtered at second precision
/// on the converted local visit time, most recent visit first.
const VISIT_QUERY: &str = "\
    SELECT urls.url, urls.title, visits.visit_time, visits.visit_duration \
    FROM urls JOIN visits ON urls.id = visits.url \
    WHERE visits.visit_time / 1000000 - 11644473600 > ?1 \
    ORDER BY visits.visit_time DESC";

/// Source of ordered visit records for a query window
///
/// `SnapshotReader` is the production implementation; tests substitute a
/// double so the caching layer can be exercised without a database.
pub trait SnapshotSource {
    /// Reads all visits strictly after the window's lower bound,
    /// most recent first
    fn read(&self, window: &QueryWindow) -> Result<Vec<VisitRecord>, HistoryError>;
}

/// Reads visit records from a private copy of the history database
#[derive(Debug)]
pub struct SnapshotReader {
    /// The live history database owned by the browser
    db_path: PathBuf,
    /// Directory the working copy is placed in
    work_dir: PathBuf,
}

/// Removes the working copy on every exit path
struct SnapshotGuard {
    path: PathBuf,
}

impl Drop for SnapshotGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

impl SnapshotReader {
    /// Creates a reader for the given database, snapshotting into `work_dir`
    pub fn new(db_path: PathBuf, work_dir: PathBuf) -> Self {
        Self { db_path, work_dir }
    }

    /// Default location of the Edge history database for this platform
    ///
    /// Returns `None` when the platform directories cannot be determined
    /// (e.g., no home directory).
    pub fn default_db_path() -> Option<PathBuf> {
        let base = directories::BaseDirs::new()?;
        let path = if cfg!(target_os = "macos") {
            base.home_dir()
                .join("Library/Application Support/Microsoft Edge/Default/History")
        } else if cfg!(target_os = "windows") {
            base.data_local_dir()
                .join("Microsoft")
                .join("Edge")
                .join("User Data")
                .join("Default")
                .join("History")
        } else {
            base.config_dir()
                .join("microsoft-edge")
                .join("Default")
                .join("History")
        };
        Some(path)
    }

    /// Copies the live database into the working directory
    ///
    /// The source is opened read-only so the copy never trips the browser's
    /// own write-lock detection. The copy lands on the same filesystem as
    /// the cache, keeping the window in which the source is held open short.
    fn copy_source(&self, copy_path: &Path) -> Result<(), HistoryError> {
        fs::create_dir_all(&self.work_dir).map_err(HistoryError::Workspace)?;

        let mut source = File::open(&self.db_path).map_err(|e| HistoryError::SourceUnavailable {
            path: self.db_path.clone(),
            source: e,
        })?;
        let mut copy = File::create(copy_path).map_err(HistoryError::Workspace)?;
        let bytes = io::copy(&mut source, &mut copy).map_err(HistoryError::Workspace)?;

        debug!(source = %self.db_path.display(), bytes, "snapshot copy taken");
        Ok(())
    }

    /// Runs the visit query against an already-snapshotted database
    fn query_copy(
        &self,
        copy_path: &Path,
        window: &QueryWindow,
    ) -> Result<Vec<VisitRecord>, HistoryError> {
        let conn = Connection::open_with_flags(copy_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let mut stmt = conn.prepare(VISIT_QUERY)?;
        let rows = stmt.query_map([unix_secs_from_local(window.since)], |row| {
            Ok(VisitRecord {
                url: row.get(0)?,
                title: row.get(1)?,
                visit_time: local_from_webkit(row.get(2)?),
                visit_duration_seconds: duration_secs_from_micros(row.get(3)?),
            })
        })?;

        let records = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), "history query complete");
        Ok(records)
    }
}

impl SnapshotSource for SnapshotReader {
    fn read(&self, window: &QueryWindow) -> Result<Vec<VisitRecord>, HistoryError> {
        // Process id in the name keeps concurrent invocations off each
        // other's copies.
        let copy_path = self
            .work_dir
            .join(format!("History-{}.snapshot", std::process::id()));

        self.copy_source(&copy_path)?;
        let _guard = SnapshotGuard {
            path: copy_path.clone(),
        };

        self.query_copy(&copy_path, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::record::webkit_from_local;
    use chrono::{NaiveDate, NaiveDateTime};
    use tempfile::TempDir;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    /// Builds a history database with the given (url, title, visit_time,
    /// duration_micros) rows
    fn seed_history(path: &Path, rows: &[(&str, &str, NaiveDateTime, i64)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE urls (id INTEGER PRIMARY KEY, url TEXT, title TEXT);
             CREATE TABLE visits (id INTEGER PRIMARY KEY, url INTEGER,
                                  visit_time INTEGER, visit_duration INTEGER);",
        )
        .unwrap();

        for (i, (url, title, visit_time, duration)) in rows.iter().enumerate() {
            let id = i as i64 + 1;
            conn.execute(
                "INSERT INTO urls (id, url, title) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, url, title],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO visits (id, url, visit_time, visit_duration)
                 VALUES (?1, ?1, ?2, ?3)",
                rusqlite::params![id, webkit_from_local(*visit_time), duration],
            )
            .unwrap();
        }
    }

    fn reader_for(db: &Path, dir: &TempDir) -> SnapshotReader {
        SnapshotReader::new(db.to_path_buf(), dir.path().join("snapshots"))
    }

    #[test]
    fn test_read_filters_strictly_after_since() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("History");
        let since = local(2024, 3, 1, 12, 0, 0);
        seed_history(
            &db,
            &[
                ("https://before.example", "before", local(2024, 3, 1, 11, 59, 59), 0),
                ("https://boundary.example", "boundary", since, 0),
                ("https://after.example", "after", local(2024, 3, 1, 12, 0, 1), 0),
            ],
        );

        let records = reader_for(&db, &dir).read(&QueryWindow::since(since)).unwrap();

        assert_eq!(records.len(), 1, "boundary and earlier visits are excluded");
        assert_eq!(records[0].url, "https://after.example");
        assert!(records[0].visit_time > since);
    }

    #[test]
    fn test_read_orders_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("History");
        seed_history(
            &db,
            &[
                ("https://a.example", "a", local(2024, 3, 2, 8, 0, 0), 0),
                ("https://c.example", "c", local(2024, 3, 2, 10, 0, 0), 0),
                ("https://b.example", "b", local(2024, 3, 2, 9, 0, 0), 0),
            ],
        );

        let window = QueryWindow::since(local(2024, 3, 1, 0, 0, 0));
        let records = reader_for(&db, &dir).read(&window).unwrap();

        let urls: Vec<_> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://c.example", "https://b.example", "https://a.example"]
        );
        assert!(records.windows(2).all(|w| w[0].visit_time >= w[1].visit_time));
    }

    #[test]
    fn test_read_is_deterministic_across_invocations() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("History");
        seed_history(
            &db,
            &[
                ("https://a.example", "a", local(2024, 3, 2, 8, 0, 0), 1_000_000),
                ("https://b.example", "b", local(2024, 3, 2, 9, 0, 0), 2_000_000),
            ],
        );

        let reader = reader_for(&db, &dir);
        let window = QueryWindow::since(local(2024, 3, 1, 0, 0, 0));
        assert_eq!(reader.read(&window).unwrap(), reader.read(&window).unwrap());
    }

    #[test]
    fn test_read_converts_duration_micros_to_seconds() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("History");
        seed_history(
            &db,
            &[("https://a.example", "a", local(2024, 3, 2, 8, 0, 0), 2_500_000)],
        );

        let window = QueryWindow::since(local(2024, 3, 1, 0, 0, 0));
        let records = reader_for(&db, &dir).read(&window).unwrap();

        assert_eq!(records[0].visit_duration_seconds, 2.5);
    }

    #[test]
    fn test_working_copy_is_removed_after_read() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("History");
        seed_history(&db, &[("https://a.example", "a", local(2024, 3, 2, 8, 0, 0), 0)]);

        let reader = reader_for(&db, &dir);
        reader
            .read(&QueryWindow::since(local(2024, 3, 1, 0, 0, 0)))
            .unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("snapshots"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty(), "no snapshot files should remain");
    }

    #[test]
    fn test_missing_source_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        let reader = reader_for(&dir.path().join("does-not-exist"), &dir);

        let err = reader.read(&QueryWindow::default()).unwrap_err();

        assert!(matches!(err, HistoryError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_corrupt_source_is_query_error_and_copy_is_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("History");
        fs::write(&db, b"this is not a sqlite database").unwrap();

        let reader = reader_for(&db, &dir);
        let err = reader.read(&QueryWindow::default()).unwrap_err();

        assert!(matches!(err, HistoryError::Query(_)));
        let leftovers: Vec<_> = fs::read_dir(dir.path().join("snapshots"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty(), "copy must be removed on failure too");
    }

    #[test]
    fn test_source_is_not_modified_by_a_read() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("History");
        seed_history(&db, &[("https://a.example", "a", local(2024, 3, 2, 8, 0, 0), 0)]);
        let before = fs::read(&db).unwrap();

        reader_for(&db, &dir)
            .read(&QueryWindow::since(local(2024, 3, 1, 0, 0, 0)))
            .unwrap();

        assert_eq!(fs::read(&db).unwrap(), before);
    }
}
