//! Edge history tool
//!
//! Loads browser visit records through the cached snapshot pipeline and
//! prints them one per line, or exports them to history.json / history.csv.

use clap::Parser;
use std::error::Error;
use std::path::Path;

use edgetools::cache::CacheStore;
use edgetools::cli::HistoryCli;
use edgetools::history::{export, HistoryQueryService, SnapshotReader};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = HistoryCli::parse();
    let window = cli.window()?;

    let cache = CacheStore::new().ok_or("could not determine a cache directory")?;
    let db_path = cli
        .history_db
        .clone()
        .or_else(SnapshotReader::default_db_path)
        .ok_or("no --history-db given and no default Edge profile path on this platform")?;

    let reader = SnapshotReader::new(db_path, cache.dir().join("snapshots"));
    let service = HistoryQueryService::new(cache, reader, cli.result_ttl());

    let records = if cli.refresh {
        service.refresh(&window)?
    } else {
        service.load(&window)?
    };

    if cli.export {
        let format = cli.format();
        export::write(&records, format, Path::new("."))?;
        println!("Data exported as {}.", format);
    } else {
        for record in &records {
            println!("{}", record);
        }
    }

    Ok(())
}
