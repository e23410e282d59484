//! Serialization of query results to JSON or CSV
//!
//! Pure boundary functions: render a record set to a string, or render and
//! write it to the fixed per-format output file. Rendering happens before
//! any file is created, so a failed export never leaves a partial file.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::history::record::VisitRecord;

/// CSV header row, matching the `VisitRecord` field names
const CSV_HEADER: &str = "url,title,visit_time,visit_duration_seconds";

/// Errors from exporting a result set
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV export with zero records; no output file is written
    #[error("Nothing to export: the result set is empty")]
    EmptyResult,

    /// Result set could not be serialized
    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Output file could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Output representation for an exported result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Fixed output filename for this format
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "history.json",
            ExportFormat::Csv => "history.csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Renders a result set in the given format
///
/// JSON always succeeds and yields an array of objects (`[]` for an empty
/// set). CSV requires at least one record and fails with
/// [`ExportError::EmptyResult`] otherwise.
pub fn render(records: &[VisitRecord], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Csv => {
            if records.is_empty() {
                return Err(ExportError::EmptyResult);
            }
            let mut out = String::from(CSV_HEADER);
            out.push('\n');
            for record in records {
                out.push_str(&csv_row(record));
                out.push('\n');
            }
            Ok(out)
        }
    }
}

/// Renders the result set and writes it to `<out_dir>/<format file name>`
///
/// Returns the path written. Nothing is written when rendering fails.
pub fn write(
    records: &[VisitRecord],
    format: ExportFormat,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    let rendered = render(records, format)?;
    let path = out_dir.join(format.file_name());
    fs::write(&path, rendered).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn csv_row(record: &VisitRecord) -> String {
    format!(
        "{},{},{},{}",
        csv_field(&record.url),
        csv_field(&record.title),
        record.visit_time.format("%Y-%m-%d %H:%M:%S"),
        record.visit_duration_seconds
    )
}

/// Quotes a field per RFC 4180 when it contains a delimiter, quote, or
/// line break
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
