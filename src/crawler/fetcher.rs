//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client with a descriptive user agent
//! - Classifying each attempt's result
//! - The bounded retry/backoff state machine
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 2xx | Succeeded |
//! | HTTP 404, 410 | PermanentSkip, never retried |
//! | HTTP 429 | Retry after `Retry-After` seconds, else linear backoff |
//! | Other HTTP status | Retry with linear backoff |
//! | Timeout, connection error, unreadable body | Retry with linear backoff |
//!
//! Every kind of retry draws from the same budget of `max_retries` attempts;
//! when it is spent the URL is Exhausted. The politeness delay is paid before
//! every attempt, retries included.

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::crawler::politeness::PolitenessPolicy;
use crate::url::CanonicalUrl;
use reqwest::header::RETRY_AFTER;
use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Result of fetching one URL, as seen by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(FetchedPage),
    /// HTTP 404/410: dropped for this run without retrying
    PermanentSkip { status_code: u16 },
    /// The attempt budget ran out
    Exhausted { attempts: u32, reason: String },
}

/// Why a single attempt did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// HTTP 429 with the parsed `Retry-After`, if any
    RateLimited { retry_after: Option<Duration> },
    /// HTTP 404 or 410
    Gone { status_code: u16 },
    /// Any other non-success status
    Http { status_code: u16 },
    /// Timeout, connection failure, or unreadable body
    Network { error: String },
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited { .. } => write!(f, "HTTP 429 Too Many Requests"),
            Self::Gone { status_code } | Self::Http { status_code } => {
                write!(f, "HTTP {}", status_code)
            }
            Self::Network { error } => write!(f, "network error: {}", error),
        }
    }
}

/// States of the per-URL fetch state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Attempting { attempt: u32 },
    Retrying { attempt: u32, wait: Duration },
    Succeeded(FetchedPage),
    PermanentSkip { status_code: u16 },
    Exhausted { attempts: u32, reason: String },
}

/// Attempt budget and backoff schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// Linear backoff: `base_backoff * attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff * attempt
    }

    /// Transition out of `Attempting { attempt }` after a failed attempt
    ///
    /// # Arguments
    ///
    /// * `attempt` - The 1-based number of the attempt that just failed
    /// * `failure` - How it failed
    ///
    /// # Returns
    ///
    /// * `PermanentSkip` - For 404 and 410, whatever the attempt number
    /// * `Exhausted` - When `attempt` reached `max_retries`
    /// * `Retrying` - Otherwise, with the `Retry-After` wait for a 429 that
    ///   carried one and linear backoff for everything else
    pub fn on_failure(&self, attempt: u32, failure: AttemptFailure) -> FetchState {
        if let AttemptFailure::Gone { status_code } = failure {
            return FetchState::PermanentSkip { status_code };
        }

        if attempt >= self.max_retries {
            return FetchState::Exhausted {
                attempts: attempt,
                reason: failure.to_string(),
            };
        }

        let wait = match failure {
            AttemptFailure::RateLimited {
                retry_after: Some(wait),
            } => wait,
            _ => self.backoff(attempt),
        };

        FetchState::Retrying { attempt, wait }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```
/// use lexicrawl::config::UserAgentConfig;
/// use lexicrawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "Lexicrawl".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Parses a numeric `Retry-After` header value (seconds)
///
/// HTTP-date values are not honored; the caller falls back to backoff.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Executes GET requests under the retry policy
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Builds the client and policy from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.request_timeout())?;
        Ok(Self::new(
            client,
            RetryPolicy::new(crawler.max_retries, crawler.base_backoff()),
        ))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetches `url`, pacing every attempt through `politeness`
    ///
    /// Drives the [`FetchState`] machine until it reaches a terminal state.
    /// The politeness delay is slept before every attempt, retries included,
    /// and any retry wait is slept on top of it.
    ///
    /// # Arguments
    ///
    /// * `url` - The canonical URL to request
    /// * `politeness` - Supplies the robots.txt crawl delay and jitter
    ///
    /// # Returns
    ///
    /// The terminal outcome. Network errors and timeouts never escape as
    /// errors; they count as failed attempts.
    pub async fn fetch(&self, url: &CanonicalUrl, politeness: &mut PolitenessPolicy) -> FetchOutcome {
        let mut state = FetchState::Attempting { attempt: 1 };

        loop {
            state = match state {
                FetchState::Attempting { attempt } => {
                    politeness.pace(&self.client, url).await;
                    match self.attempt(url.as_url()).await {
                        Ok(page) => FetchState::Succeeded(page),
                        Err(failure) => {
                            tracing::debug!("Attempt {} for {} failed: {}", attempt, url, failure);
                            self.policy.on_failure(attempt, failure)
                        }
                    }
                }
                FetchState::Retrying { attempt, wait } => {
                    tracing::info!(
                        "Retrying {} in {:.1}s (attempt {}/{})",
                        url,
                        wait.as_secs_f64(),
                        attempt + 1,
                        self.policy.max_retries
                    );
                    tokio::time::sleep(wait).await;
                    FetchState::Attempting {
                        attempt: attempt + 1,
                    }
                }
                FetchState::Succeeded(page) => return FetchOutcome::Success(page),
                FetchState::PermanentSkip { status_code } => {
                    return FetchOutcome::PermanentSkip { status_code }
                }
                FetchState::Exhausted { attempts, reason } => {
                    return FetchOutcome::Exhausted { attempts, reason }
                }
            };
        }
    }

    /// One GET request, classified
    async fn attempt(&self, url: &Url) -> Result<FetchedPage, AttemptFailure> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(network_failure)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, &response));
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(network_failure)?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            body,
        })
    }
}

fn classify_status(status: StatusCode, response: &Response) -> AttemptFailure {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => AttemptFailure::Gone {
            status_code: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => AttemptFailure::RateLimited {
            retry_after: response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after),
        },
        _ => AttemptFailure::Http {
            status_code: status.as_u16(),
        },
    }
}

fn network_failure(e: reqwest::Error) -> AttemptFailure {
    let error = if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    };
    AttemptFailure::Network { error }
}
