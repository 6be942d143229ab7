//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Fetching is best-effort: any failure yields an allow-all policy with no crawl delay.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::ParsedRobots;

use crate::url::CanonicalUrl;
use reqwest::Client;

/// Fetches robots.txt for the origin of `url`
///
/// Network errors, non-success statuses and unreadable bodies all fall back
/// to [`ParsedRobots::allow_all`].
pub async fn fetch_robots(client: &Client, url: &CanonicalUrl) -> ParsedRobots {
    let robots_url = url.robots_url();

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt fetch failed for {}: {}", robots_url, e);
            return ParsedRobots::allow_all();
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt at {} returned HTTP {}, assuming allow-all",
            robots_url,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::debug!("robots.txt body unreadable at {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
