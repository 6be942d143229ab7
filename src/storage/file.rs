//! Plain-file storage backend
//!
//! Layout under the output directory:
//!
//! ```text
//! all_urls_master.txt      one canonical URL per line, append only
//! url_mapping.json         {"<id>": "<url>", ...}
//! <topic>/vocab_<id>.txt   one artifact per page
//! ```

use crate::storage::traits::{ArtifactKey, IdMapping, LedgerStore, StorageResult};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const LEDGER_FILE: &str = "all_urls_master.txt";
pub const MAPPING_FILE: &str = "url_mapping.json";

/// File-backed [`LedgerStore`]
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens (creating if needed) the output directory at `root`
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(LEDGER_FILE)
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.root.join(MAPPING_FILE)
    }

    pub fn artifact_path(&self, key: &ArtifactKey) -> PathBuf {
        self.root
            .join(&key.topic)
            .join(format!("vocab_{}.txt", key.id))
    }
}

/// Reads a file, mapping "not found" to `None`
fn read_optional(path: &Path) -> StorageResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Replaces `path` atomically with `content`
fn write_atomic(path: &Path, content: &[u8]) -> StorageResult<()> {
    let tmp = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

impl LedgerStore for FileStore {
    fn load_visited(&self) -> StorageResult<Vec<String>> {
        let Some(content) = read_optional(&self.ledger_path())? else {
            return Ok(Vec::new());
        };
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Appends one line and syncs it before returning
    fn append_visited(&mut self, url: &str) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.ledger_path())?;
        writeln!(file, "{}", url)?;
        file.sync_data()?;
        Ok(())
    }

    fn load_mapping(&self) -> StorageResult<IdMapping> {
        match read_optional(&self.mapping_path())? {
            Some(content) if !content.trim().is_empty() => Ok(serde_json::from_str(&content)?),
            _ => Ok(IdMapping::new()),
        }
    }

    /// Replaces the JSON file through a temp file and rename, so a crash
    /// leaves either the old mapping or the new one
    fn save_mapping(&mut self, mapping: &IdMapping) -> StorageResult<()> {
        let json = serde_json::to_string_pretty(mapping)?;
        write_atomic(&self.mapping_path(), json.as_bytes())
    }

    fn put_artifact(&mut self, key: &ArtifactKey, content: &str) -> StorageResult<()> {
        let path = self.artifact_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_atomic(&path, content.as_bytes())
    }

    fn get_artifact(&self, key: &ArtifactKey) -> StorageResult<Option<String>> {
        read_optional(&self.artifact_path(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("output")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_fresh_directory_is_empty() {
        let (_dir, store) = store();
        assert!(store.load_visited().unwrap().is_empty());
        assert!(store.load_mapping().unwrap().is_empty());
        assert!(!store.contains_artifact(&ArtifactKey::new("t", "x")).unwrap());
    }

    #[test]
    fn test_ledger_appends_lines() {
        let (_dir, mut store) = store();
        store.append_visited("https://site.test/shop").unwrap();
        store.append_visited("https://site.test/shop/item1").unwrap();

        let content = fs::read_to_string(store.ledger_path()).unwrap();
        assert_eq!(content, "https://site.test/shop\nhttps://site.test/shop/item1\n");

        // A reopened store sees the same entries
        let reopened = FileStore::new(store.root()).unwrap();
        assert_eq!(
            reopened.load_visited().unwrap(),
            vec!["https://site.test/shop", "https://site.test/shop/item1"]
        );
    }

    #[test]
    fn test_load_visited_skips_blank_lines() {
        let (_dir, store) = store();
        fs::write(store.ledger_path(), "\nhttps://a.test/x\n\n  https://a.test/y  \n").unwrap();
        assert_eq!(
            store.load_visited().unwrap(),
            vec!["https://a.test/x", "https://a.test/y"]
        );
    }

    #[test]
    fn test_mapping_is_json_object() {
        let (_dir, mut store) = store();
        let mut mapping = IdMapping::new();
        mapping.insert("7a57d41d2693eb0a".into(), "https://site.test/shop".into());
        store.save_mapping(&mapping).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.mapping_path()).unwrap()).unwrap();
        assert_eq!(raw["7a57d41d2693eb0a"], "https://site.test/shop");
        assert_eq!(store.load_mapping().unwrap(), mapping);
        assert!(!store.mapping_path().with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_mapping_is_an_error() {
        let (_dir, store) = store();
        fs::write(store.mapping_path(), "{ not json").unwrap();
        assert!(matches!(
            store.load_mapping(),
            Err(crate::storage::StorageError::Serialization(_))
        ));
    }

    #[test]
    fn test_artifacts_are_per_topic_and_overwritten() {
        let (_dir, mut store) = store();
        let key = ArtifactKey::new("fruit", "39b7aea6df04ac7a");

        store.put_artifact(&key, "apple\npear").unwrap();
        assert!(store.artifact_path(&key).ends_with("fruit/vocab_39b7aea6df04ac7a.txt"));
        assert_eq!(store.get_artifact(&key).unwrap().as_deref(), Some("apple\npear"));

        store.put_artifact(&key, "apple").unwrap();
        assert_eq!(store.get_artifact(&key).unwrap().as_deref(), Some("apple"));

        let other_topic = ArtifactKey::new("veg", "39b7aea6df04ac7a");
        assert!(!store.contains_artifact(&other_topic).unwrap());
    }
}
