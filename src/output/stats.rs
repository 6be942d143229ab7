//! Crawl run statistics
//!
//! Counters are collected by the coordinator while it runs and printed by
//! the binary once the run ends.

use crate::storage::LedgerSummary;
use chrono::{DateTime, Utc};

/// Counters for one seed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedStatistics {
    pub topic: String,
    pub seed: String,

    /// Pages fetched, processed and recorded this run
    pub visited: u64,

    /// Pages skipped because the ledger already had them
    pub already_visited: u64,

    /// 404/410 responses
    pub permanent_skips: u64,

    /// URLs that ran out of attempts
    pub exhausted: u64,

    /// URLs disallowed by robots.txt
    pub disallowed: u64,

    /// In-prefix links accepted into the frontier
    pub links_enqueued: u64,

    /// Links dropped as malformed, excluded or out of prefix
    pub links_rejected: u64,
}

/// Totals for a whole run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub seeds: Vec<SeedStatistics>,
}

impl RunStatistics {
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            seeds: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn total_visited(&self) -> u64 {
        self.seeds.iter().map(|s| s.visited).sum()
    }

    pub fn total_permanent_skips(&self) -> u64 {
        self.seeds.iter().map(|s| s.permanent_skips).sum()
    }

    pub fn total_exhausted(&self) -> u64 {
        self.seeds.iter().map(|s| s.exhausted).sum()
    }

    pub fn total_disallowed(&self) -> u64 {
        self.seeds.iter().map(|s| s.disallowed).sum()
    }
}

/// Prints run statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Seeds:");
    for seed in &stats.seeds {
        println!(
            "  [{}] {}: {} visited, {} skipped (404/410), {} exhausted, {} disallowed, {} links enqueued",
            seed.topic,
            seed.seed,
            seed.visited,
            seed.permanent_skips,
            seed.exhausted,
            seed.disallowed,
            seed.links_enqueued
        );
    }
    println!();

    println!("Totals:");
    println!("  Pages visited: {}", stats.total_visited());
    println!("  Permanently skipped: {}", stats.total_permanent_skips());
    println!("  Exhausted (retry next run): {}", stats.total_exhausted());
    println!("  Disallowed by robots.txt: {}", stats.total_disallowed());
}

/// Prints the sizes of an existing ledger
pub fn print_ledger_summary(summary: &LedgerSummary) {
    println!("=== Ledger ===\n");
    println!("  Visited URLs: {}", summary.visited);
    println!("  Mapped ids: {}", summary.mapped_ids);
}
