//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a bounded retry/backoff state machine
//! - Request pacing from robots.txt crawl delays and jitter
//! - Token and link extraction
//! - The run-scoped frontier and overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod politeness;
mod tokenizer;

pub use coordinator::{crawl, Coordinator};
pub use fetcher::{
    build_http_client, parse_retry_after, AttemptFailure, FetchOutcome, FetchState, FetchedPage,
    Fetcher, RetryPolicy,
};
pub use frontier::Frontier;
pub use parser::{ContentProcessor, ProcessedPage};
pub use politeness::PolitenessPolicy;
pub use tokenizer::{ExtractorMode, TokenExtractor, Tokenizer, VocabArtifact};
