//! Lexicrawl: a polite, resumable vocabulary crawler
//!
//! This crate crawls pages reachable from seed URLs within a site prefix,
//! extracts vocabulary tokens and in-prefix links, and durably records progress
//! so repeated runs never refetch completed work.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod seeds;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Lexicrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Durable write failed: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to read seeds from {path}: {source}")]
    Seeds {
        path: String,
        source: std::io::Error,
    },

}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Reasons a raw URL is rejected by the canonicalizer or the prefix filter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("URL matches exclusion pattern '{0}'")]
    Excluded(String),

    #[error("URL is outside the crawl prefix {0}")]
    OutOfPrefix(String),
}

/// Result type alias for Lexicrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, FetchOutcome};
pub use storage::{Ledger, LedgerStore};
pub use url::{stable_id, CanonicalUrl, Canonicalizer};
