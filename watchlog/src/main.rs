//! watchlog - read-only reporting over the analytics store
//!
//! Thin presentation layer over `watchlog_core::analytics`: every
//! subcommand maps to one query engine operation and prints plain text, or
//! JSON with `--json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use watchlog_core::db::Store;
use watchlog_core::{analytics, channel_url, Config};

#[derive(Parser)]
#[command(name = "watchlog")]
#[command(about = "Personal watch-history analytics")]
#[command(version)]
struct Args {
    /// Database path (defaults to the XDG data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Dataset summary statistics
    Overview,
    /// Top channels by view count
    Channels {
        /// Number of channels to show
        #[arg(long, default_value = "10")]
        limit: i64,
        /// Include the deleted/private sentinel channel
        #[arg(long)]
        include_deleted: bool,
        /// Restrict the ranking to one calendar year
        #[arg(long)]
        year: Option<i32>,
    },
    /// Per-year activity summaries
    Years,
    /// Gap-filled monthly view counts, most recent first
    Months,
    /// View events within one month
    Videos {
        #[arg(long)]
        year: i32,
        /// Calendar month (1-12)
        #[arg(long)]
        month: u32,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        watchlog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = args.db.clone().unwrap_or_else(|| config.database_path());
    tracing::info!(path = %db_path.display(), "Opening store");

    let store = Store::open(&db_path).context("failed to open store")?;
    store.init_schema().context("failed to initialize schema")?;

    match args.command {
        Command::Overview => {
            let overview = analytics::dataset_overview(&store)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                println!("Views:           {}", overview.total_views);
                println!("Unique videos:   {}", overview.unique_videos);
                println!("Unique channels: {}", overview.unique_channels);
                println!("Rewatched:       {}", overview.total_rewatch_count);
                println!(
                    "Range:           {} to {}",
                    overview.first_view.as_deref().unwrap_or("-"),
                    overview.last_view.as_deref().unwrap_or("-"),
                );
            }
        }
        Command::Channels {
            limit,
            include_deleted,
            year,
        } => {
            let channels = match year {
                Some(year) => {
                    analytics::top_channels_for_year(&store, year, limit, include_deleted)?
                }
                None => analytics::top_channels(&store, limit, include_deleted)?,
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&channels)?);
            } else {
                for (rank, channel) in channels.iter().enumerate() {
                    println!(
                        "{:>3}. {} ({} views, {} videos, {} rewatched, {} to {})",
                        rank + 1,
                        channel.channel_name,
                        channel.total_views,
                        channel.unique_videos,
                        channel.rewatch_count,
                        channel.first_view.as_deref().unwrap_or("-"),
                        channel.last_view.as_deref().unwrap_or("-"),
                    );
                    if let Some(url) = channel_url(&channel.channel_id) {
                        println!("     {}", url);
                    }
                }
            }
        }
        Command::Years => {
            let years = analytics::per_year_summary(&store)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&years)?);
            } else {
                for summary in &years {
                    println!(
                        "{}: {} views, {} videos, {} channels, {} rewatched",
                        summary.year,
                        summary.total_views,
                        summary.unique_videos,
                        summary.unique_channels,
                        summary.rewatch_count,
                    );
                }
            }
        }
        Command::Months => {
            let months = analytics::monthly_view_counts(&store)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&months)?);
            } else {
                for month in &months {
                    println!("{}: {}", month.month, month.count);
                }
            }
        }
        Command::Videos { year, month } => {
            let views = analytics::videos_for_month(&store, year, month)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                for view in &views {
                    println!(
                        "{}  {}  ({})",
                        view.timestamp, view.title, view.channel_name
                    );
                }
            }
        }
    }

    Ok(())
}
