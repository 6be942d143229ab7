//! Seed loading
//!
//! A seeds directory holds one `<topic>.txt` file per topic, one URL per line.

use crate::{CrawlError, Result};
use std::fs;
use std::path::Path;

/// A named group of seed URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub name: String,
    pub seeds: Vec<String>,
}

/// Parses the contents of one seed file
pub fn parse_seeds(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Loads every `*.txt` topic file in `dir`, ordered by file name
///
/// Topics without any seed lines are dropped.
///
/// # Arguments
///
/// * `dir` - Directory holding one `<topic>.txt` file per topic
///
/// # Returns
///
/// * `Ok(Vec<Topic>)` - Topics named after their file stems
/// * `Err(CrawlError::Seeds)` - The directory or a seed file could not be read
pub fn load_topics(dir: &Path) -> Result<Vec<Topic>> {
    let seeds_error = |source| CrawlError::Seeds {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(seeds_error)? {
        let path = entry.map_err(seeds_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();

    let mut topics = Vec::with_capacity(files.len());
    for path in files {
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let content = fs::read_to_string(&path).map_err(|source| CrawlError::Seeds {
            path: path.display().to_string(),
            source,
        })?;

        let seeds = parse_seeds(&content);
        if seeds.is_empty() {
            tracing::warn!("Topic '{}' has no seeds, skipping", name);
            continue;
        }
        topics.push(Topic { name, seeds });
    }

    Ok(topics)
}
