//! Request pacing
//!
//! Before every request attempt the crawler sleeps for the host's robots.txt
//! crawl delay plus a uniformly random jitter. The robots.txt of each origin
//! is fetched once per run; failures count as no delay.
//!
//! Crawl delays above [`MAX_CRAWL_DELAY`] are clamped to it.

use crate::config::CrawlerConfig;
use crate::robots::RobotsCache;
use crate::url::CanonicalUrl;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;
use std::time::Duration;

/// Upper bound on a robots.txt crawl delay
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(60);

/// Pacing state for one crawl run
///
/// Holds the robots.txt cache, the product token used to pick robots.txt
/// groups, and the jitter source.
pub struct PolitenessPolicy {
    robots: RobotsCache,
    agent: String,
    jitter_min: Duration,
    jitter_max: Duration,
    respect_disallow: bool,
    rng: StdRng,
}

impl PolitenessPolicy {
    /// Creates a policy for the given robots.txt product token
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the jitter bounds and whether Disallow rules are honored
    /// * `agent` - Product token matched against robots.txt `User-agent` lines
    pub fn new(config: &CrawlerConfig, agent: impl Into<String>) -> Self {
        Self::with_rng(config, agent, StdRng::from_entropy())
    }

    /// Creates a policy with a caller-provided random source
    pub fn with_rng(config: &CrawlerConfig, agent: impl Into<String>, rng: StdRng) -> Self {
        Self {
            robots: RobotsCache::new(),
            agent: agent.into(),
            jitter_min: Duration::from_millis(config.jitter_min_ms),
            jitter_max: Duration::from_millis(config.jitter_max_ms),
            respect_disallow: config.respect_robots_disallow,
            rng,
        }
    }

    /// The host's crawl delay, fetching robots.txt on first contact
    ///
    /// # Returns
    ///
    /// The robots.txt `Crawl-delay` for this agent, [`Duration::ZERO`] when
    /// none applies, or [`MAX_CRAWL_DELAY`] when the value is larger.
    pub async fn crawl_delay(&mut self, client: &Client, url: &CanonicalUrl) -> Duration {
        let robots = self.robots.get_or_fetch(client, url).await;
        let Some(seconds) = robots.crawl_delay(&self.agent) else {
            return Duration::ZERO;
        };
        clamp_crawl_delay(seconds, url)
    }

    /// Checks robots.txt Disallow rules for `url`
    ///
    /// # Returns
    ///
    /// * `true` - The URL may be fetched, or Disallow rules are not honored
    /// * `false` - robots.txt disallows the URL for this agent
    pub async fn is_allowed(&mut self, client: &Client, url: &CanonicalUrl) -> bool {
        if !self.respect_disallow {
            return true;
        }
        let robots = self.robots.get_or_fetch(client, url).await;
        robots.is_allowed(url.as_url().as_str(), &self.agent)
    }

    /// Draws one jitter sample from `[jitter_min, jitter_max]`
    pub fn jitter(&mut self) -> Duration {
        if self.jitter_max <= self.jitter_min {
            return self.jitter_min;
        }
        self.rng.gen_range(self.jitter_min..=self.jitter_max)
    }

    /// Delay owed before the next request to `url`'s host
    pub async fn next_delay(&mut self, client: &Client, url: &CanonicalUrl) -> Duration {
        self.crawl_delay(client, url)
            .await
            .saturating_add(self.jitter())
    }

    /// Sleeps for the delay owed before a request to `url`. Returns the delay.
    pub async fn pace(&mut self, client: &Client, url: &CanonicalUrl) -> Duration {
        let delay = self.next_delay(client, url).await;
        tracing::trace!("Pacing {:.2}s before requesting {}", delay.as_secs_f64(), url);
        tokio::time::sleep(delay).await;
        delay
    }

    pub fn robots(&self) -> &RobotsCache {
        &self.robots
    }

    pub fn robots_mut(&mut self) -> &mut RobotsCache {
        &mut self.robots
    }
}

/// Converts a robots.txt delay to a [`Duration`] no larger than [`MAX_CRAWL_DELAY`]
fn clamp_crawl_delay(seconds: f64, url: &CanonicalUrl) -> Duration {
    match Duration::try_from_secs_f64(seconds) {
        Ok(delay) if delay <= MAX_CRAWL_DELAY => delay,
        _ => {
            tracing::warn!(
                "Crawl-delay {} for {} exceeds {}s, using the maximum",
                seconds,
                url.origin(),
                MAX_CRAWL_DELAY.as_secs()
            );
            MAX_CRAWL_DELAY
        }
    }
}
