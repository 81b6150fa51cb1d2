//! Job-state database schema

use rusqlite::Connection;

/// Creates all tables and indexes if they do not exist
///
/// `links` holds the discovered universe with a completion flag; rowid
/// order is discovery order. `meta` holds run bookkeeping such as the
/// configuration hash.
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS links (
            url TEXT PRIMARY KEY,
            discovered_at TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            completed_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_links_completed ON links (completed);

        CREATE TABLE IF NOT EXISTS meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )
}
