//! In-process storage backend
//!
//! Nothing survives the process; useful for embedding and for tests that
//! need to inspect what the crawler wrote.

use crate::storage::traits::{ArtifactKey, IdMapping, LedgerStore, StorageResult};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    visited: Vec<String>,
    mapping: IdMapping,
    artifacts: HashMap<ArtifactKey, String>,
}

impl MemoryStore {
    /// An empty store; nothing survives the process
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger entries in append order
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    pub fn mapping(&self) -> &IdMapping {
        &self.mapping
    }

    pub fn artifacts(&self) -> &HashMap<ArtifactKey, String> {
        &self.artifacts
    }
}

impl LedgerStore for MemoryStore {
    fn load_visited(&self) -> StorageResult<Vec<String>> {
        Ok(self.visited.clone())
    }

    fn append_visited(&mut self, url: &str) -> StorageResult<()> {
        self.visited.push(url.to_string());
        Ok(())
    }

    fn load_mapping(&self) -> StorageResult<IdMapping> {
        Ok(self.mapping.clone())
    }

    fn save_mapping(&mut self, mapping: &IdMapping) -> StorageResult<()> {
        self.mapping = mapping.clone();
        Ok(())
    }

    fn put_artifact(&mut self, key: &ArtifactKey, content: &str) -> StorageResult<()> {
        self.artifacts.insert(key.clone(), content.to_string());
        Ok(())
    }

    fn get_artifact(&self, key: &ArtifactKey) -> StorageResult<Option<String>> {
        Ok(self.artifacts.get(key).cloned())
    }
}
