//! Per-run robots.txt cache
//!
//! robots.txt is fetched at most once per origin per run; failures are cached
//! as allow-all so a broken host is not re-asked on every request.

use crate::robots::{fetch_robots, ParsedRobots};
use crate::url::CanonicalUrl;
use reqwest::Client;
use std::collections::HashMap;

/// Parsed robots.txt keyed by origin (`scheme://host[:port]`)
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the robots.txt governing `url`, fetching it on first use
    pub async fn get_or_fetch(&mut self, client: &Client, url: &CanonicalUrl) -> &ParsedRobots {
        let origin = url.origin();
        if !self.entries.contains_key(&origin) {
            tracing::debug!("Fetching robots.txt for {}", origin);
            let robots = fetch_robots(client, url).await;
            self.entries.insert(origin.clone(), robots);
        }
        self.entries.entry(origin).or_default()
    }

    /// Returns the cached entry without fetching
    pub fn get(&self, url: &CanonicalUrl) -> Option<&ParsedRobots> {
        self.entries.get(&url.origin())
    }

    /// Seeds the cache, e.g. for tests or preloaded policies
    pub fn insert(&mut self, url: &CanonicalUrl, robots: ParsedRobots) {
        self.entries.insert(url.origin(), robots);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
