//! Persistence ledger
//!
//! In-memory view of everything durable: the visited set, the id mapping in
//! both directions, and the pending mapping changes. All writes go through
//! the [`LedgerStore`] it owns.

use crate::storage::traits::{ArtifactKey, IdMapping, LedgerStore, StorageResult};
use crate::url::{stable_id, stable_id_of, CanonicalUrl};
use std::collections::{HashMap, HashSet};

pub struct Ledger<S: LedgerStore> {
    store: S,
    visited: HashSet<CanonicalUrl>,
    mapping: IdMapping,
    ids: HashMap<CanonicalUrl, String>,
    mapping_dirty: bool,
}

impl<S: LedgerStore> Ledger<S> {
    /// Loads the visited ledger and id mapping from `store`
    ///
    /// Missing files or tables load as empty. Duplicate ledger lines collapse
    /// and unparseable ones are skipped with a warning.
    pub fn load(store: S) -> StorageResult<Self> {
        let mut visited = HashSet::new();
        for line in store.load_visited()? {
            match line.parse::<CanonicalUrl>() {
                Ok(url) => {
                    visited.insert(url);
                }
                Err(e) => tracing::warn!("Ignoring ledger entry '{}': {}", line, e),
            }
        }

        let mapping = store.load_mapping()?;
        let mut ids = HashMap::with_capacity(mapping.len());
        for (id, raw) in &mapping {
            match raw.parse::<CanonicalUrl>() {
                Ok(url) => {
                    ids.entry(url).or_insert_with(|| id.clone());
                }
                Err(e) => tracing::warn!("Ignoring mapping entry {} -> '{}': {}", id, raw, e),
            }
        }

        tracing::info!(
            "Loaded ledger: {} visited URLs, {} mapped ids",
            visited.len(),
            mapping.len()
        );

        Ok(Self {
            store,
            visited,
            mapping,
            ids,
            mapping_dirty: false,
        })
    }

    /// Whether `url` has a completed, durable visit
    pub fn contains(&self, url: &CanonicalUrl) -> bool {
        self.visited.contains(url)
    }

    /// The in-memory visited set
    pub fn visited(&self) -> &HashSet<CanonicalUrl> {
        &self.visited
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Durably appends `url` to the ledger and marks it visited
    ///
    /// Recording an already-visited URL is a no-op.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The URL is durably recorded
    /// * `Err(StorageError)` - The append failed; the in-memory set is unchanged
    pub fn record_visit(&mut self, url: &CanonicalUrl) -> StorageResult<()> {
        if self.visited.contains(url) {
            tracing::debug!("{} already in ledger", url);
            return Ok(());
        }
        self.store.append_visited(&url.to_string())?;
        self.visited.insert(url.clone());
        Ok(())
    }

    /// Returns the id already mapped for `url`, or derives and records a new one
    ///
    /// A new id is normally [`stable_id`]. If that id already belongs to a
    /// different URL, the first free id of `<url>#1`, `<url>#2`, ... is used
    /// instead, so two URLs never share an id or an artifact. Once recorded,
    /// the mapping keeps the choice stable across runs.
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical URL of a page about to be stored
    ///
    /// # Returns
    ///
    /// The page's id; the mapping is marked dirty if the id is new
    pub fn id_for(&mut self, url: &CanonicalUrl) -> String {
        if let Some(id) = self.ids.get(url) {
            return id.clone();
        }

        let key = url.to_string();
        let mut id = stable_id(url);
        let mut attempt = 0u32;
        while let Some(existing) = self.mapping.get(&id) {
            attempt += 1;
            let fallback = stable_id_of(&format!("{}#{}", key, attempt));
            tracing::warn!(
                "Id {} already maps to {}, using {} for {}",
                id,
                existing,
                fallback,
                url
            );
            id = fallback;
        }

        self.mapping.insert(id.clone(), key);
        self.mapping_dirty = true;
        self.ids.insert(url.clone(), id.clone());
        id
    }

    /// Writes (or overwrites) the vocabulary artifact for `id` under `topic`
    ///
    /// # Arguments
    ///
    /// * `topic` - The seed file's topic name
    /// * `id` - An id from [`id_for`](Self::id_for)
    /// * `content` - The rendered vocabulary
    pub fn store_artifact(&mut self, topic: &str, id: &str, content: &str) -> StorageResult<()> {
        self.store.put_artifact(&ArtifactKey::new(topic, id), content)
    }

    /// Persists the id mapping, merged with whatever is already stored
    ///
    /// Entries already persisted win over in-memory ones, so no id is ever
    /// dropped or pointed at a different URL.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The mapping is persisted, or there was nothing new to write
    /// * `Err(StorageError)` - Reading or writing the stored mapping failed;
    ///   the pending entries stay dirty
    pub fn flush_mapping(&mut self) -> StorageResult<()> {
        if !self.mapping_dirty {
            return Ok(());
        }

        let mut merged = self.store.load_mapping()?;
        for (id, url) in &self.mapping {
            merged.entry(id.clone()).or_insert_with(|| url.clone());
        }
        self.store.save_mapping(&merged)?;

        tracing::debug!("Flushed id mapping ({} entries)", merged.len());
        self.mapping = merged;
        self.mapping_dirty = false;
        Ok(())
    }

    /// Adds a mapping entry for every visited URL that lacks one, then flushes
    ///
    /// Returns the number of entries added.
    pub fn rebuild_mapping(&mut self) -> StorageResult<usize> {
        let mut missing: Vec<CanonicalUrl> = self
            .visited
            .iter()
            .filter(|url| !self.ids.contains_key(*url))
            .cloned()
            .collect();
        missing.sort();

        for url in &missing {
            self.id_for(url);
        }
        self.flush_mapping()?;

        tracing::info!("Rebuilt id mapping: {} entries added", missing.len());
        Ok(missing.len())
    }

    /// Id to canonical URL string
    pub fn mapping(&self) -> &IdMapping {
        &self.mapping
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
