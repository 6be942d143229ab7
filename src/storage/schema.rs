//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the SQLite backend.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Append-only visited ledger; duplicates tolerated, order preserved by seq
CREATE TABLE IF NOT EXISTS visited (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    visited_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_visited_url ON visited(url);

-- Stable id mapping; rows are never updated
CREATE TABLE IF NOT EXISTS url_mapping (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL
);

-- Vocabulary artifacts, one per (topic, id)
CREATE TABLE IF NOT EXISTS artifacts (
    topic TEXT NOT NULL,
    id TEXT NOT NULL,
    content TEXT NOT NULL,
    written_at TEXT NOT NULL,
    PRIMARY KEY (topic, id)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
