//! # watchlog-core
//!
//! Core library for watchlog - personal watch-history analytics.
//!
//! This library provides:
//! - A record parser for history export JSON
//! - SQLite storage with an idempotent schema and sentinel channel
//! - A transactional, all-or-nothing ingestion pipeline
//! - A read-only analytics query engine
//!
//! ## Architecture
//!
//! Data flows in one direction:
//!
//! raw export -> parser (per record) -> ingestion (one transaction) ->
//! store -> analytics (read-only aggregates) -> presentation layer
//! (external).
//!
//! ## Example
//!
//! ```rust,no_run
//! use watchlog_core::db::Store;
//! use watchlog_core::{analytics, ingest};
//!
//! # fn main() -> watchlog_core::Result<()> {
//! let stats = ingest::ingest_export_file(
//!     "history.db".as_ref(),
//!     "watch-history.json".as_ref(),
//! )?;
//! println!("{} views ingested", stats.views_inserted);
//!
//! let store = Store::open("history.db".as_ref())?;
//! let overview = analytics::dataset_overview(&store)?;
//! println!("{} total views", overview.total_views);
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Store;
pub use error::{Error, Result};
pub use ingest::IngestStats;
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod types;
