//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the LedgerStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ArtifactKey, IdMapping, LedgerStore, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Ledger writes must survive a crash, so keep full sync
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of stored artifacts
    pub fn count_artifacts(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM artifacts", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl LedgerStore for SqliteStore {
    fn load_visited(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM visited ORDER BY seq")?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    fn append_visited(&mut self, url: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO visited (url, visited_at) VALUES (?1, ?2)",
            params![url, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load_mapping(&self) -> StorageResult<IdMapping> {
        let mut stmt = self.conn.prepare("SELECT id, url FROM url_mapping")?;
        let mapping = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<IdMapping, _>>()?;
        Ok(mapping)
    }

    /// Inserts new ids in one transaction; existing ids are never rewritten
    fn save_mapping(&mut self, mapping: &IdMapping) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO url_mapping (id, url) VALUES (?1, ?2)")?;
            for (id, url) in mapping {
                stmt.execute(params![id, url])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn put_artifact(&mut self, key: &ArtifactKey, content: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO artifacts (topic, id, content, written_at) VALUES (?1, ?2, ?3, ?4)",
            params![key.topic, key.id, content, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn get_artifact(&self, key: &ArtifactKey) -> StorageResult<Option<String>> {
        let content = self
            .conn
            .query_row(
                "SELECT content FROM artifacts WHERE topic = ?1 AND id = ?2",
                params![key.topic, key.id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }
}
