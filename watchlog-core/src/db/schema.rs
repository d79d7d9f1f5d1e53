//! Database schema definition and initialization.
//!
//! The store is fully reloaded on every re-ingest, so the schema is managed
//! as an idempotent CREATE batch plus a drop-all for reset rather than
//! versioned migrations.

use rusqlite::{params, Connection};

use crate::types::{SENTINEL_CHANNEL_ID, SENTINEL_CHANNEL_NAME};

/// Schema DDL. Every statement uses IF NOT EXISTS so the batch is safe to
/// run against an already-initialized store.
const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS channels (
        channel_id   TEXT PRIMARY KEY,
        channel_name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS videos (
        video_id   TEXT PRIMARY KEY,
        title      TEXT NOT NULL,
        channel_id TEXT NOT NULL REFERENCES channels(channel_id)
    );

    -- channel_id is denormalized from videos for query performance
    CREATE TABLE IF NOT EXISTS views (
        view_id    INTEGER PRIMARY KEY AUTOINCREMENT,
        video_id   TEXT NOT NULL REFERENCES videos(video_id),
        channel_id TEXT NOT NULL REFERENCES channels(channel_id),
        timestamp  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_views_channel ON views(channel_id);
    CREATE INDEX IF NOT EXISTS idx_views_channel_timestamp ON views(channel_id, timestamp);
    CREATE INDEX IF NOT EXISTS idx_views_timestamp ON views(timestamp);

    -- Expression index: year-grouped queries were measured 4-10x slower
    -- without it at 50k+ rows
    CREATE INDEX IF NOT EXISTS idx_views_year ON views(strftime('%Y', timestamp));
"#;

/// Create all tables and indexes and seed the sentinel channel row.
///
/// Safe to call multiple times.
pub fn init_schema(conn: &Connection) -> crate::error::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO channels (channel_id, channel_name) VALUES (?1, ?2)",
        params![SENTINEL_CHANNEL_ID, SENTINEL_CHANNEL_NAME],
    )?;

    tracing::debug!("Schema initialized");
    Ok(())
}

/// Drop all tables, for full-reset re-ingestion.
///
/// Child tables drop before parents so FK constraints are never violated;
/// indexes go away with their tables.
pub fn drop_all(conn: &Connection) -> crate::error::Result<()> {
    conn.execute_batch(
        "DROP TABLE IF EXISTS views;
         DROP TABLE IF EXISTS videos;
         DROP TABLE IF EXISTS channels;",
    )?;

    tracing::debug!("All tables dropped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let channels: i64 = conn
            .query_row("SELECT COUNT(*) FROM channels", [], |r| r.get(0))
            .unwrap();
        assert_eq!(channels, 1, "only the sentinel row should exist");
    }

    #[test]
    fn test_tables_and_indexes_created() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        for table in ["channels", "videos", "views"] {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }

        for index in [
            "idx_views_channel",
            "idx_views_channel_timestamp",
            "idx_views_timestamp",
            "idx_views_year",
        ] {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?",
                    [index],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Index {} should exist", index);
        }
    }

    #[test]
    fn test_sentinel_seeded() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let name: String = conn
            .query_row(
                "SELECT channel_name FROM channels WHERE channel_id = ?",
                [SENTINEL_CHANNEL_ID],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(name, SENTINEL_CHANNEL_NAME);
    }

    #[test]
    fn test_drop_all_then_reinit() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        drop_all(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('channels', 'videos', 'views')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);

        init_schema(&conn).unwrap();
        let channels: i64 = conn
            .query_row("SELECT COUNT(*) FROM channels", [], |r| r.get(0))
            .unwrap();
        assert_eq!(channels, 1);
    }
}
