//! Storage module for persisting crawl progress
//!
//! This module handles all durable state for the crawler:
//! - The append-only visited ledger
//! - The stable id mapping (additive only)
//! - Vocabulary artifacts
//!
//! Backends implement [`LedgerStore`]; the crawl loop only talks to
//! [`Ledger`].

mod file;
mod ledger;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use file::{FileStore, LEDGER_FILE, MAPPING_FILE};
pub use ledger::Ledger;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ArtifactKey, IdMapping, LedgerStore, StorageError, StorageResult};

use crate::config::{OutputConfig, StorageBackend};
use std::path::PathBuf;

/// Database file used by the sqlite backend
///
/// Falls back to `ledger.db` inside the output directory.
pub fn database_path(output: &OutputConfig) -> PathBuf {
    match &output.database_path {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(&output.output_dir).join("ledger.db"),
    }
}

/// Sizes of an existing ledger, for `--stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSummary {
    pub visited: usize,
    pub mapped_ids: usize,
}

/// Loads the ledger described by `output` and reports its sizes
pub fn summarize(output: &OutputConfig) -> StorageResult<LedgerSummary> {
    fn of<S: LedgerStore>(ledger: Ledger<S>) -> LedgerSummary {
        LedgerSummary {
            visited: ledger.visited_count(),
            mapped_ids: ledger.mapping().len(),
        }
    }

    Ok(match output.backend {
        StorageBackend::Files => of(Ledger::load(FileStore::new(&output.output_dir)?)?),
        StorageBackend::Sqlite => of(Ledger::load(SqliteStore::new(&database_path(output))?)?),
    })
}

/// Loads the ledger described by `output` and runs [`Ledger::rebuild_mapping`]
pub fn rebuild_mapping(output: &OutputConfig) -> StorageResult<usize> {
    match output.backend {
        StorageBackend::Files => Ledger::load(FileStore::new(&output.output_dir)?)?.rebuild_mapping(),
        StorageBackend::Sqlite => {
            Ledger::load(SqliteStore::new(&database_path(output))?)?.rebuild_mapping()
        }
    }
}
