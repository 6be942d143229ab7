//! Storage traits and error types
//!
//! This module defines the capability interface the ledger writes through,
//! so the crawl loop never touches files or databases directly.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Stable id to canonical URL string
pub type IdMapping = BTreeMap<String, String>;

/// Identifies one vocabulary artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactKey {
    /// Topic the page was crawled for
    pub topic: String,
    /// Stable id of the page URL
    pub id: String,
}

impl ArtifactKey {
    pub fn new(topic: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            id: id.into(),
        }
    }
}

/// Durable backend for the visited ledger, id mapping and artifacts
///
/// Every write must be durable when the method returns `Ok`. Errors are
/// fatal to the crawl run.
pub trait LedgerStore {
    /// Reads every ledger entry in append order. Duplicates are returned as is.
    fn load_visited(&self) -> StorageResult<Vec<String>>;

    /// Appends one canonical URL to the ledger
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical URL string; callers never append it twice
    ///
    /// # Returns
    ///
    /// `Ok(())` only once the entry would survive a crash
    fn append_visited(&mut self, url: &str) -> StorageResult<()>;

    /// Reads the persisted id mapping; empty if none exists yet
    fn load_mapping(&self) -> StorageResult<IdMapping>;

    /// Persists `mapping` in full
    ///
    /// Callers pass a mapping already merged with [`LedgerStore::load_mapping`].
    /// Backends may additionally refuse to overwrite existing ids.
    fn save_mapping(&mut self, mapping: &IdMapping) -> StorageResult<()>;

    /// Writes or replaces an artifact
    fn put_artifact(&mut self, key: &ArtifactKey, content: &str) -> StorageResult<()>;

    /// Reads an artifact, if present
    fn get_artifact(&self, key: &ArtifactKey) -> StorageResult<Option<String>>;

    fn contains_artifact(&self, key: &ArtifactKey) -> StorageResult<bool> {
        Ok(self.get_artifact(key)?.is_some())
    }
}
