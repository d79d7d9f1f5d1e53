//! watchlog-ingest - load a watch-history export into the analytics store
//!
//! One-shot batch tool: reads the full export JSON, optionally resets the
//! store, and performs a single transactional bulk load.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/watchlog/history.db (~/.local/share/watchlog/history.db)
//! - Logs: $XDG_STATE_HOME/watchlog/watchlog.log (~/.local/state/watchlog/watchlog.log)
//! - Config: $XDG_CONFIG_HOME/watchlog/config.toml (~/.config/watchlog/config.toml)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use watchlog_core::db::Store;
use watchlog_core::{ingest, Config};

#[derive(Parser)]
#[command(name = "watchlog-ingest")]
#[command(about = "Load a watch-history export into the analytics store")]
#[command(version)]
struct Args {
    /// Path to the history export JSON file
    export: PathBuf,

    /// Database path (defaults to the XDG data directory)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Drop and recreate the store before ingesting (full reload)
    #[arg(long)]
    reset: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        watchlog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("watchlog-ingest starting");

    let db_path = args.db.clone().unwrap_or_else(|| config.database_path());
    println!("Database: {}", db_path.display());

    // Load the export up front so a missing or malformed file is reported
    // before the store is touched
    let records = ingest::load_export(&args.export)
        .with_context(|| format!("failed to load export {}", args.export.display()))?;
    println!("Export:   {} ({} records)", args.export.display(), records.len());

    let store = Store::open(&db_path).context("failed to open store")?;
    if args.reset {
        println!("Resetting store (full reload)");
        store.reset().context("failed to reset store")?;
    } else {
        store.init_schema().context("failed to initialize schema")?;
    }

    let stats = ingest::ingest_records(&store, &records).context("ingest failed")?;

    println!("\nIngest complete:");
    println!("  Total records:     {}", stats.records_total);
    println!("  Videos processed:  {}", stats.records_processed);
    println!("  Records skipped:   {}", stats.records_skipped);
    println!("  Channels inserted: {}", stats.channels_inserted);
    println!("  Videos inserted:   {}", stats.videos_inserted);
    println!("  Views inserted:    {}", stats.views_inserted);

    tracing::info!(
        processed = stats.records_processed,
        skipped = stats.records_skipped,
        views = stats.views_inserted,
        "watchlog-ingest complete"
    );

    Ok(())
}
