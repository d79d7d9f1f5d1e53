//! Store handle owning the SQLite connection.

use crate::error::{Error, Result};
use crate::types::{Channel, Video};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Connection owner for the history store.
///
/// The connection is exclusively owned by whichever call holds the guard at
/// a time; there is no pooling or sharing discipline needed at this scale.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initialize the schema (idempotent)
    pub fn init_schema(&self) -> Result<()> {
        super::schema::init_schema(&self.connection())
    }

    /// Drop and recreate the schema.
    ///
    /// The only supported mutation after ingest; used for full-reload
    /// re-ingestion.
    pub fn reset(&self) -> Result<()> {
        let conn = self.connection();
        super::schema::drop_all(&conn)?;
        super::schema::init_schema(&conn)
    }

    /// Get the underlying connection
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// Point lookup of a channel by its natural key
    pub fn get_channel(&self, channel_id: &str) -> Result<Option<Channel>> {
        let conn = self.connection();
        conn.query_row(
            "SELECT channel_id, channel_name FROM channels WHERE channel_id = ?1",
            [channel_id],
            |row| {
                Ok(Channel {
                    channel_id: row.get(0)?,
                    channel_name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    /// Point lookup of a video by its natural key
    pub fn get_video(&self, video_id: &str) -> Result<Option<Video>> {
        let conn = self.connection();
        conn.query_row(
            "SELECT video_id, title, channel_id FROM videos WHERE video_id = ?1",
            [video_id],
            |row| {
                Ok(Video {
                    video_id: row.get(0)?,
                    title: row.get(1)?,
                    channel_id: row.get(2)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    /// Total number of view events in the store
    pub fn view_count(&self) -> Result<i64> {
        let conn = self.connection();
        conn.query_row("SELECT COUNT(*) FROM views", [], |r| r.get(0))
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SENTINEL_CHANNEL_ID;

    #[test]
    fn test_open_on_disk_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/history.db");

        let store = Store::open(&path).unwrap();
        store.init_schema().unwrap();

        assert!(path.exists());
        assert_eq!(store.view_count().unwrap(), 0);
    }

    #[test]
    fn test_reset_reseeds_sentinel() {
        let store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();

        store
            .connection()
            .execute(
                "INSERT INTO channels (channel_id, channel_name) VALUES ('c1', 'Channel One')",
                [],
            )
            .unwrap();

        store.reset().unwrap();

        assert!(store.get_channel("c1").unwrap().is_none());
        let sentinel = store.get_channel(SENTINEL_CHANNEL_ID).unwrap().unwrap();
        assert!(sentinel.is_sentinel());
    }

    #[test]
    fn test_point_lookups_on_empty_store() {
        let store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();

        assert!(store.get_video("missing").unwrap().is_none());
        assert!(store.get_channel("missing").unwrap().is_none());
    }
}
