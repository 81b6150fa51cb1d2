//! SQLite state-store implementation

use crate::state::JobState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StateStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

/// SQLite-backed state store, one database file per manufacturer
pub struct SqliteStateStore {
    conn: Connection,
}

impl SqliteStateStore {
    /// Opens (or creates) the state database at the given path
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl StateStore for SqliteStateStore {
    fn insert_links(&mut self, urls: &[String]) -> StorageResult<usize> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO links (url, discovered_at) VALUES (?1, ?2)",
            )?;
            for url in urls {
                inserted += stmt.execute(params![url, now])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn load_state(&self) -> StorageResult<JobState> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, completed FROM links ORDER BY rowid")?;

        let mut universe = Vec::new();
        let mut completed = HashSet::new();

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?))
        })?;

        for row in rows {
            let (url, is_completed) = row?;
            if is_completed {
                completed.insert(url.clone());
            }
            universe.push(url);
        }

        Ok(JobState::new(universe, completed))
    }

    fn mark_completed(&mut self, urls: &[String]) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "UPDATE links SET completed = 1, completed_at = ?2 WHERE url = ?1",
            )?;
            for url in urls {
                stmt.execute(params![url, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("DELETE FROM links; DELETE FROM meta;")?;
        Ok(())
    }

    fn set_meta(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }
}
