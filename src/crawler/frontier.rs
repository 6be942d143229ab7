//! Pending-URL queue for one crawl run
//!
//! The frontier is FIFO, so traversal is breadth-first in discovery order.
//! Every URL it has ever accepted is remembered for the whole run, across
//! seeds, so a URL is enqueued at most once per run no matter how many pages
//! or seeds lead to it.

use crate::url::CanonicalUrl;
use std::collections::{HashSet, VecDeque};

/// Run-scoped frontier with a per-seed pending queue
#[derive(Debug, Default)]
pub struct Frontier {
    pending: VecDeque<CanonicalUrl>,
    enqueued: HashSet<CanonicalUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts crawling a new seed
    ///
    /// Pending URLs left over from the previous seed are dropped; they stay
    /// in the enqueued set, so they are not fetched again this run.
    ///
    /// # Returns
    ///
    /// The number of pending URLs that were dropped
    pub fn start_session(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Adds `url` to the pending queue
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical URL to enqueue
    /// * `visited` - The durable visited set; URLs in it are never enqueued
    ///
    /// # Returns
    ///
    /// * `true` - The URL was accepted
    /// * `false` - It was already enqueued this run or is already visited
    pub fn enqueue(&mut self, url: CanonicalUrl, visited: &HashSet<CanonicalUrl>) -> bool {
        if visited.contains(&url) {
            tracing::trace!("Not enqueueing {}: already visited", url);
            return false;
        }
        if !self.enqueued.insert(url.clone()) {
            tracing::trace!("Not enqueueing {}: already enqueued", url);
            return false;
        }
        self.pending.push_back(url);
        true
    }

    /// Removes and returns the earliest-enqueued pending URL
    pub fn dequeue(&mut self) -> Option<CanonicalUrl> {
        self.pending.pop_front()
    }

    /// Number of URLs waiting to be fetched
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct URLs accepted this run
    pub fn enqueued_count(&self) -> usize {
        self.enqueued.len()
    }

    pub fn was_enqueued(&self, url: &CanonicalUrl) -> bool {
        self.enqueued.contains(url)
    }
}
