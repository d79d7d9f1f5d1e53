//! Ingestion pipeline for watch-history exports
//!
//! Loads one full export file and performs a single all-or-nothing bulk
//! load into the store:
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//! │ Export JSON  │ ──► │ ingest_records │ ──► │      Store       │
//! │ (full file)  │     │ (one txn)      │     │ channels/videos/ │
//! └──────────────┘     └────────────────┘     │      views       │
//!                             │               └──────────────────┘
//!                             ▼
//!                    parser::parse_record
//! ```
//!
//! There is deliberately no skip-bad-rows mode: a single malformed watch
//! record is treated as a sign the whole export may be suspect, and the
//! batch rolls back entirely.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use watchlog_core::ingest;
//!
//! # fn main() -> watchlog_core::Result<()> {
//! let stats = ingest::ingest_export_file("history.db".as_ref(), "watch-history.json".as_ref())?;
//! println!("{} views from {} records", stats.views_inserted, stats.records_total);
//! # Ok(())
//! # }
//! ```

pub mod parser;

pub use parser::{ParsedView, RawRecord, RawSubtitle};

use std::collections::HashSet;
use std::path::Path;

use rusqlite::params;

use crate::db::Store;
use crate::error::{Error, Result};

/// Statistics from one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Total records in the export
    pub records_total: usize,
    /// Watch records successfully ingested
    pub records_processed: usize,
    /// Non-watch records (posts, etc.)
    pub records_skipped: usize,
    /// Distinct channels first referenced by this batch (sentinel included)
    pub channels_inserted: usize,
    /// Distinct videos first referenced by this batch
    pub videos_inserted: usize,
    /// View events appended
    pub views_inserted: usize,
}

/// Load and parse a history export file.
///
/// A missing file and a malformed file are reported distinctly
/// ([`Error::ExportNotFound`] vs [`Error::Json`]).
pub fn load_export(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(Error::ExportNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    let records: Vec<RawRecord> = serde_json::from_str(&contents)?;

    tracing::info!(path = %path.display(), records = records.len(), "Loaded export");
    Ok(records)
}

/// Ingest history records into the store.
///
/// The schema must already be initialized. The whole batch runs inside one
/// transaction; insert order is channel -> video -> view per record so FK
/// dependencies are always satisfied. Channel and video inserts are
/// insert-if-absent; every watch record appends a view row (repeat views
/// are rewatches, not duplicates).
///
/// Any parse or database error rolls back the entire batch before
/// propagating; no partial ingest state is ever visible.
pub fn ingest_records(store: &Store, records: &[RawRecord]) -> Result<IngestStats> {
    let mut conn = store.connection();
    let tx = conn.transaction()?;

    let mut stats = IngestStats {
        records_total: records.len(),
        ..IngestStats::default()
    };

    // First-reference tracking for the inserted counts
    let mut channels_seen: HashSet<String> = HashSet::new();
    let mut videos_seen: HashSet<String> = HashSet::new();

    {
        let mut insert_channel = tx.prepare(
            "INSERT OR IGNORE INTO channels (channel_id, channel_name) VALUES (?1, ?2)",
        )?;
        let mut insert_video = tx.prepare(
            "INSERT OR IGNORE INTO videos (video_id, title, channel_id) VALUES (?1, ?2, ?3)",
        )?;
        let mut insert_view = tx.prepare(
            "INSERT INTO views (video_id, channel_id, timestamp) VALUES (?1, ?2, ?3)",
        )?;

        for record in records {
            let parsed = match parser::parse_record(record)? {
                Some(parsed) => parsed,
                None => {
                    stats.records_skipped += 1;
                    continue;
                }
            };

            if channels_seen.insert(parsed.channel_id.clone()) {
                insert_channel.execute(params![parsed.channel_id, parsed.channel_name])?;
                stats.channels_inserted += 1;
            }

            if videos_seen.insert(parsed.video_id.clone()) {
                insert_video.execute(params![
                    parsed.video_id,
                    parsed.title,
                    parsed.channel_id
                ])?;
                stats.videos_inserted += 1;
            }

            insert_view.execute(params![
                parsed.video_id,
                parsed.channel_id,
                parsed.timestamp
            ])?;
            stats.views_inserted += 1;
            stats.records_processed += 1;
        }
    }

    tx.commit()?;

    tracing::info!(
        processed = stats.records_processed,
        skipped = stats.records_skipped,
        views = stats.views_inserted,
        "Ingest complete"
    );

    Ok(stats)
}

/// Convenience composition for operator use: load the export, open the
/// store, initialize the schema, and ingest.
pub fn ingest_export_file(db_path: &Path, export_path: &Path) -> Result<IngestStats> {
    let records = load_export(export_path)?;

    let store = Store::open(db_path)?;
    store.init_schema()?;
    ingest_records(&store, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn watch(video_id: &str, channel: Option<&str>, ts: &str) -> RawRecord {
        let mut value = json!({
            "title": format!("Watched Video {video_id}"),
            "titleUrl": format!("https://www.youtube.com/watch?v={video_id}"),
            "time": ts,
        });
        if let Some(channel_id) = channel {
            value["subtitles"] = json!([{
                "name": format!("Channel {channel_id}"),
                "url": format!("https://www.youtube.com/channel/{channel_id}"),
            }]);
        }
        serde_json::from_value(value).unwrap()
    }

    fn post(ts: &str) -> RawRecord {
        serde_json::from_value(json!({
            "title": "Viewed a community post",
            "titleUrl": "https://www.youtube.com/post/abc123",
            "time": ts,
        }))
        .unwrap()
    }

    fn test_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    #[test]
    fn test_posts_counted_as_skipped() {
        let store = test_store();
        let records = vec![
            watch("v1", Some("c1"), "2024-01-01T10:00:00Z"),
            post("2024-01-02T10:00:00Z"),
            post("2024-01-03T10:00:00Z"),
        ];

        let stats = ingest_records(&store, &records).unwrap();
        assert_eq!(stats.records_total, 3);
        assert_eq!(stats.records_processed, 1);
        assert_eq!(stats.records_skipped, 2);
        assert_eq!(stats.views_inserted, 1);
    }

    #[test]
    fn test_repeat_views_dedupe_channel_and_video_only() {
        let store = test_store();
        let records = vec![
            watch("v1", Some("c1"), "2024-01-01T10:00:00Z"),
            watch("v1", Some("c1"), "2024-01-05T10:00:00Z"),
        ];

        let stats = ingest_records(&store, &records).unwrap();
        assert_eq!(stats.channels_inserted, 1);
        assert_eq!(stats.videos_inserted, 1);
        assert_eq!(stats.views_inserted, 2);
        assert_eq!(store.view_count().unwrap(), 2);
    }

    #[test]
    fn test_malformed_record_rolls_back_whole_batch() {
        let store = test_store();
        let mut records = vec![
            watch("v1", Some("c1"), "2024-01-01T10:00:00Z"),
            watch("v2", Some("c2"), "2024-01-02T10:00:00Z"),
        ];
        // Ambiguous watch URL: classified as content, fails in the parser
        records.push(
            serde_json::from_value(json!({
                "title": "Watched Broken",
                "titleUrl": "https://www.youtube.com/watch?v=a&v=b",
                "time": "2024-01-03T10:00:00Z",
            }))
            .unwrap(),
        );

        let err = ingest_records(&store, &records).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));

        // Nothing from the batch is visible, not even the first two records
        assert_eq!(store.view_count().unwrap(), 0);
        assert!(store.get_video("v1").unwrap().is_none());
        assert!(store.get_channel("c1").unwrap().is_none());
    }

    #[test]
    fn test_load_export_distinguishes_missing_from_malformed() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_export(&missing),
            Err(Error::ExportNotFound(_))
        ));

        let malformed = dir.path().join("broken.json");
        std::fs::write(&malformed, "{not json").unwrap();
        assert!(matches!(load_export(&malformed), Err(Error::Json(_))));
    }
}
