//! Command-line interfaces for the history and token tools
//!
//! Both binaries parse their arguments here so flag semantics live next to
//! each other and can be unit tested without running the binaries.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::history::export::ExportFormat;
use crate::history::record::{QueryWindow, WindowParseError};
use crate::history::service::DEFAULT_RESULT_TTL;

/// View and export Edge browser history through cached snapshots
#[derive(Parser, Debug)]
#[command(name = "edgehist")]
#[command(about = "Manage and view Edge browser history")]
#[command(version)]
pub struct HistoryCli {
    /// Path to the history database (defaults to the Edge profile's file)
    #[arg(long, value_name = "PATH")]
    pub history_db: Option<PathBuf>,

    /// Only show visits after this local time (YYYY-MM-DD or "YYYY-MM-DD hh:mm")
    #[arg(long, value_name = "WHEN")]
    pub since: Option<String>,

    /// Time-to-live for the cached result, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub ttl: Option<u64>,

    /// Evict the cached result before loading
    #[arg(long)]
    pub refresh: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Output as CSV
    #[arg(long)]
    pub csv: bool,

    /// Write results to history.json / history.csv instead of stdout
    #[arg(long)]
    pub export: bool,
}

impl HistoryCli {
    /// Query window from `--since`, defaulting to the start of yesterday
    pub fn window(&self) -> Result<QueryWindow, WindowParseError> {
        match &self.since {
            Some(raw) => QueryWindow::parse(raw),
            None => Ok(QueryWindow::default()),
        }
    }

    /// Result cache TTL from `--ttl`, defaulting to 300 seconds
    pub fn result_ttl(&self) -> Duration {
        self.ttl.map(Duration::from_secs).unwrap_or(DEFAULT_RESULT_TTL)
    }

    /// Export format: csv unless `--json` is given
    pub fn format(&self) -> ExportFormat {
        if self.json {
            ExportFormat::Json
        } else {
            ExportFormat::Csv
        }
    }
}

/// Cache and export a JWT token acquired through the browser auth flow
#[derive(Parser, Debug)]
#[command(name = "edgejwt")]
#[command(about = "Manage cached JWT tokens")]
#[command(version)]
pub struct TokenCli {
    /// Environment to use for this invocation, overriding the remembered one
    #[arg(long, value_name = "ENV")]
    pub env: Option<String>,

    /// Remember this environment as the default
    #[arg(long, value_name = "ENV")]
    pub set_env: Option<String>,

    /// Remember this token expiry (seconds) as the default
    #[arg(long, value_name = "SECONDS")]
    pub expiry: Option<u64>,

    /// Discard the cached token and re-acquire it
    #[arg(long)]
    pub renew: bool,

    /// Name of the environment variable in the export line
    #[arg(long, value_name = "NAME")]
    pub exp_var: Option<String>,

    /// Print the shell export line
    #[arg(long)]
    pub export: bool,

    /// Print the cached token and exit
    #[arg(long)]
    pub show: bool,

    /// Store this token directly, skipping the browser flow
    #[arg(long, value_name = "TOKEN")]
    pub set_token: Option<String>,
}

impl TokenCli {
    /// Environment variable name for the export line
    pub fn export_var(&self) -> &str {
        self.exp_var.as_deref().unwrap_or("JWT_TOKEN")
    }
}
