use crate::crawler::ExtractorMode;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Lexicrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum number of pages visited per seed URL
    pub max_pages: u32,

    /// Attempts allowed per URL before it is dropped for this run
    pub max_retries: u32,

    /// Linear backoff unit between attempts (milliseconds)
    pub base_backoff_ms: u64,

    /// Per-attempt request timeout (seconds)
    pub request_timeout_secs: u64,

    /// Lower bound of the random pause added before every request (milliseconds)
    pub jitter_min_ms: u64,

    /// Upper bound of the random pause added before every request (milliseconds)
    pub jitter_max_ms: u64,

    /// Substrings that reject a URL when found in its host or path
    pub exclude_patterns: Vec<String>,

    /// Skip URLs disallowed for our agent by robots.txt
    pub respect_robots_disallow: bool,
}

impl CrawlerConfig {
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 100,
            max_retries: 3,
            base_backoff_ms: 2000,
            request_timeout_secs: 10,
            jitter_min_ms: 1000,
            jitter_max_ms: 3000,
            exclude_patterns: vec!["signin".to_string(), "login".to_string()],
            respect_robots_disallow: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Full User-Agent header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Which durable store backs the ledger, mapping and artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    Files,
    Sqlite,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory for the ledger, mapping and vocabulary artifacts
    pub output_dir: String,

    #[serde(default)]
    pub backend: StorageBackend,

    /// Path to the SQLite database file (sqlite backend only)
    #[serde(default)]
    pub database_path: Option<String>,
}

/// Token extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractorConfig {
    pub mode: ExtractorMode,

    /// Keep only tokens made entirely of alphabetic characters
    pub alphabetic_only: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::default(),
            alphabetic_only: true,
        }
    }
}
