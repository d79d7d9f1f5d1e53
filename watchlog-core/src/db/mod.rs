//! Database layer for watchlog
//!
//! SQLite storage with:
//! - An idempotent schema plus drop-all for full-reload resets
//! - A connection-owning store handle shared by ingestion and analytics

pub mod schema;
pub mod store;

pub use store::Store;
