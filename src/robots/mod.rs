//! Robots.txt handling module
//!
//! This module implements the crawl policy gate: before a website is crawled,
//! its root robots.txt is fetched once and checked for a blanket denial.
//! Every failure (timeouts, network errors, non-200 statuses, unreadable
//! bodies) fails open.

mod parser;

pub use parser::RobotsPolicy;

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Builds the robots.txt location for a site: `{scheme}://{host[:port]}/robots.txt`
///
/// Returns None if the seed cannot be parsed or has no host.
pub fn robots_url(seed: &str) -> Option<Url> {
    let seed = Url::parse(seed.trim()).ok()?;
    seed.host_str()?;

    let mut robots = seed;
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    Some(robots)
}

/// Fetches robots.txt for a site
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `seed` - Any URL on the site
/// * `user_agent` - The identity to present
/// * `timeout` - Upper bound on the request
///
/// # Returns
///
/// * `Some(RobotsPolicy)` - The site answered 200 with a readable body
/// * `None` - Anything else
pub async fn fetch_robots(
    client: &Client,
    seed: &str,
    user_agent: &str,
    timeout: Duration,
) -> Option<RobotsPolicy> {
    let url = robots_url(seed)?;
    tracing::debug!("Fetching {}", url);

    let response = match client
        .get(url.clone())
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unavailable at {}: {}", url, e);
            return None;
        }
    };

    if response.status() != StatusCode::OK {
        tracing::debug!("robots.txt at {} returned {}", url, response.status());
        return None;
    }

    match response.text().await {
        Ok(body) => Some(RobotsPolicy::from_content(&body)),
        Err(e) => {
            tracing::debug!("Failed to read robots.txt body from {}: {}", url, e);
            None
        }
    }
}

/// Decides whether a website may be crawled
///
/// Denies only when robots.txt was fetched with status 200 and contains a
/// blanket `Disallow: /`; every other outcome allows the crawl.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `seed` - The website's seed URL
/// * `user_agent` - The identity to present
/// * `timeout` - Upper bound on the robots.txt request
///
/// # Returns
///
/// * `true` - Crawling is permitted
/// * `false` - The site disallows all crawling
pub async fn is_crawl_allowed(
    client: &Client,
    seed: &str,
    user_agent: &str,
    timeout: Duration,
) -> bool {
    match fetch_robots(client, seed, user_agent, timeout).await {
        Some(policy) if policy.blocks_everything() => {
            tracing::info!("robots.txt disallows crawling {}", seed);
            false
        }
        _ => true,
    }
}
