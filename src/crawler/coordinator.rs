//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the pieces together:
//! - Loading the ledger so completed work is never refetched
//! - One frontier per run, with a breadth-first session per seed
//! - Robots checks, paced fetching and retrying
//! - Processing pages and recording visits and artifacts
//!
//! Everything runs sequentially: one request in flight, one seed at a time,
//! seeds in input order.

use crate::config::{Config, StorageBackend};
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::ContentProcessor;
use crate::crawler::politeness::PolitenessPolicy;
use crate::crawler::tokenizer::Tokenizer;
use crate::output::{RunStatistics, SeedStatistics};
use crate::seeds::Topic;
use crate::storage::{database_path, FileStore, Ledger, LedgerStore, SqliteStore};
use crate::url::Canonicalizer;
use crate::Result;

/// Main crawler coordinator structure
pub struct Coordinator<S: LedgerStore> {
    config: Config,
    ledger: Ledger<S>,
    fetcher: Fetcher,
    politeness: PolitenessPolicy,
    processor: ContentProcessor,
    frontier: Frontier,
}

impl<S: LedgerStore> Coordinator<S> {
    /// Creates a coordinator writing through `store`
    ///
    /// Loads the existing ledger and mapping from the store and builds the
    /// HTTP client.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - Durable backend for the ledger, mapping and artifacts
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl
    /// * `Err(CrawlError)` - The store could not be read or the client built
    pub fn new(config: Config, store: S) -> Result<Self> {
        let ledger = Ledger::load(store)?;
        let fetcher = Fetcher::from_config(&config.crawler, &config.user_agent)?;
        let politeness =
            PolitenessPolicy::new(&config.crawler, config.user_agent.crawler_name.clone());
        let processor = ContentProcessor::new(
            Canonicalizer::new(&config.crawler.exclude_patterns),
            Tokenizer::new(config.extractor.mode, config.extractor.alphabetic_only),
        );

        Ok(Self {
            config,
            ledger,
            fetcher,
            politeness,
            processor,
            frontier: Frontier::new(),
        })
    }

    /// Replaces the content processor, e.g. to plug in another extractor
    pub fn with_processor(mut self, processor: ContentProcessor) -> Self {
        self.processor = processor;
        self
    }

    /// Replaces the politeness policy, e.g. to seed its jitter
    pub fn with_politeness(mut self, politeness: PolitenessPolicy) -> Self {
        self.politeness = politeness;
        self
    }

    /// Crawls every seed of every topic in order
    ///
    /// Each call is one run: a URL is enqueued at most once across all of
    /// its seeds.
    ///
    /// # Returns
    ///
    /// * `Ok(RunStatistics)` - Per-seed counters and run timestamps
    /// * `Err(CrawlError)` - A durable write failed and the run was aborted
    pub async fn run(&mut self, topics: &[Topic]) -> Result<RunStatistics> {
        let mut stats = RunStatistics::start();
        self.frontier = Frontier::new();
        tracing::info!(
            "Starting crawl: {} topics, {} pages per seed",
            topics.len(),
            self.config.crawler.max_pages
        );

        for topic in topics {
            tracing::info!("Topic '{}' ({} seeds)", topic.name, topic.seeds.len());
            for seed in &topic.seeds {
                let seed_stats = self.crawl_seed(&topic.name, seed).await?;
                stats.seeds.push(seed_stats);
            }
        }

        self.ledger.flush_mapping()?;
        stats.finish();

        tracing::info!(
            "Crawl complete: {} pages visited, {} skipped, {} exhausted",
            stats.total_visited(),
            stats.total_permanent_skips(),
            stats.total_exhausted()
        );
        Ok(stats)
    }

    /// Crawls one seed until its queue empties or the page cap is reached
    ///
    /// The seed shares the run's enqueued set with every seed crawled before
    /// it on this coordinator.
    ///
    /// # Arguments
    ///
    /// * `topic` - Topic the seed's artifacts are filed under
    /// * `seed` - Raw seed URL; its canonical form is also the link prefix
    ///
    /// # Returns
    ///
    /// * `Ok(SeedStatistics)` - Counters for this seed, empty if it was invalid
    /// * `Err(CrawlError)` - A durable write failed
    pub async fn crawl_seed(&mut self, topic: &str, seed: &str) -> Result<SeedStatistics> {
        let mut stats = SeedStatistics {
            topic: topic.to_string(),
            seed: seed.to_string(),
            ..SeedStatistics::default()
        };

        let prefix = match self.processor.canonicalizer().canonicalize(seed) {
            Ok(prefix) => prefix,
            Err(e) => {
                tracing::warn!("Skipping seed '{}': {}", seed, e);
                return Ok(stats);
            }
        };

        let dropped = self.frontier.start_session();
        if dropped > 0 {
            tracing::debug!("Dropped {} URLs pending from the previous seed", dropped);
        }

        if self.ledger.contains(&prefix) {
            tracing::info!("Seed {} already visited, nothing to do", prefix);
            stats.already_visited += 1;
            return Ok(stats);
        }
        if !self.frontier.enqueue(prefix.clone(), self.ledger.visited()) {
            tracing::info!("Seed {} already reached earlier in this run", prefix);
            return Ok(stats);
        }

        let max_pages = u64::from(self.config.crawler.max_pages);
        while stats.visited < max_pages {
            let Some(url) = self.frontier.dequeue() else {
                break;
            };

            if self.ledger.contains(&url) {
                tracing::debug!("Skipping {}: already visited", url);
                stats.already_visited += 1;
                continue;
            }

            if !self.politeness.is_allowed(self.fetcher.client(), &url).await {
                tracing::warn!("Skipping {}: disallowed by robots.txt", url);
                stats.disallowed += 1;
                continue;
            }

            match self.fetcher.fetch(&url, &mut self.politeness).await {
                FetchOutcome::Success(page) => {
                    let processed = self.processor.process(&page.body, &page.final_url, &prefix);

                    let id = self.ledger.id_for(&url);
                    self.ledger
                        .store_artifact(topic, &id, &processed.vocabulary.render())?;
                    self.ledger.record_visit(&url)?;
                    stats.visited += 1;

                    let mut new_links = 0;
                    for link in processed.links {
                        if self.frontier.enqueue(link, self.ledger.visited()) {
                            new_links += 1;
                        }
                    }
                    stats.links_enqueued += new_links;
                    stats.links_rejected += processed.rejected_links as u64;

                    tracing::info!(
                        "[{}/{}] {} -> {} ({} tokens, {} new links, {} queued)",
                        stats.visited,
                        max_pages,
                        url,
                        id,
                        processed.vocabulary.len(),
                        new_links,
                        self.frontier.len()
                    );
                }
                FetchOutcome::PermanentSkip { status_code } => {
                    tracing::warn!("Skipping {}: HTTP {}", url, status_code);
                    stats.permanent_skips += 1;
                }
                FetchOutcome::Exhausted { attempts, reason } => {
                    tracing::warn!(
                        "Giving up on {} after {} attempts: {} (will retry next run)",
                        url,
                        attempts,
                        reason
                    );
                    stats.exhausted += 1;
                }
            }
        }

        if stats.visited >= max_pages && !self.frontier.is_empty() {
            tracing::info!(
                "Page cap reached for {}, {} URLs left unvisited",
                prefix,
                self.frontier.len()
            );
        }

        self.ledger.flush_mapping()?;
        Ok(stats)
    }

    pub fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger<S> {
        self.ledger
    }
}

/// Runs a complete crawl with the backend named in the configuration
///
/// # Example
///
/// ```no_run
/// use lexicrawl::config::load_config;
/// use lexicrawl::crawler::crawl;
/// use lexicrawl::seeds::load_topics;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("lexicrawl.toml"))?;
/// let topics = load_topics(Path::new("seeds"))?;
/// let stats = crawl(config, &topics).await?;
/// println!("{} pages visited", stats.total_visited());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, topics: &[Topic]) -> Result<RunStatistics> {
    match config.output.backend {
        StorageBackend::Files => {
            let store = FileStore::new(&config.output.output_dir)?;
            Coordinator::new(config, store)?.run(topics).await
        }
        StorageBackend::Sqlite => {
            let store = SqliteStore::new(&database_path(&config.output))?;
            Coordinator::new(config, store)?.run(topics).await
        }
    }
}
