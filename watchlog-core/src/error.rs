//! Error types for watchlog-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the watchlog-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export file does not exist (reported before any work is attempted)
    #[error("export file not found: {0}")]
    ExportNotFound(PathBuf),

    /// Malformed JSON in the export
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data corruption in a record classified as watchable content
    #[error("parse error in {field}: {message}")]
    Parse { field: &'static str, message: String },

    /// Month outside 1-12 passed by a caller
    #[error("month out of range (expected 1-12): {0}")]
    InvalidMonth(u32),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for watchlog-core
pub type Result<T> = std::result::Result<T, Error>;
