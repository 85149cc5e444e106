//! HTTP fetcher implementation
//!
//! This module handles all page requests made during a crawl:
//! - Building the shared HTTP client
//! - Choosing a browser identity per crawl task
//! - Single-attempt GET requests bounded by a timeout and the cancel signal
//! - Skipping non-textual payloads
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::url::same_scope;
use crate::ConfigError;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects; relative links resolve against it
        final_url: Url,
        /// Page body content
        body: String,
    },

    /// Page is not textual (image, archive, PDF, ...)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Server answered with a non-success status, including a redirect
    /// that was not followed
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, unreadable body, etc.)
    NetworkError {
        /// Error description
        error: String,
    },

    /// The cancel signal fired while the request was in flight
    Cancelled,
}

/// Pool of browser identities presented to websites
///
/// One identity is drawn per crawl task and used for all of its requests.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    agents: Vec<String>,
}

impl IdentityPool {
    /// Creates a pool from user-agent strings
    ///
    /// # Returns
    ///
    /// * `Ok(IdentityPool)` - At least one non-blank identity was given
    /// * `Err(ConfigError)` - The pool would be empty
    pub fn new(agents: Vec<String>) -> Result<Self, ConfigError> {
        let agents: Vec<String> = agents
            .into_iter()
            .map(|agent| agent.trim().to_string())
            .filter(|agent| !agent.is_empty())
            .collect();

        if agents.is_empty() {
            return Err(ConfigError::Validation(
                "user-agent pool cannot be empty".to_string(),
            ));
        }

        Ok(Self { agents })
    }

    pub fn from_config(config: &UserAgentConfig) -> Result<Self, ConfigError> {
        Self::new(config.pool.clone())
    }

    /// Draws an identity uniformly at random
    pub fn pick(&self) -> &str {
        &self.agents[fastrand::usize(..self.agents.len())]
    }
}

/// Builds the HTTP client shared by every crawl task
///
/// The client carries no default user agent; each request sets the
/// identity of the task that issues it. Redirects are followed only while
/// they stay in the host scope of the requested URL; a redirect elsewhere
/// is returned as-is.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use listing_scout::config::CrawlerConfig;
/// use listing_scout::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.fetch_timeout_secs);

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(scoped_redirects())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Redirect policy that never leaves the host scope of the first request
fn scoped_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match attempt.previous().first() {
            Some(origin) if !same_scope(origin, attempt.url()) => attempt.stop(),
            _ => attempt.follow(),
        }
    })
}

/// Fetches one page, once
///
/// # Request Flow
///
/// 1. Send GET with the task's identity, bounded by `timeout`
/// 2. Race the request against the cancel signal
/// 3. Non-2xx status → `HttpError`
/// 4. Present, non-textual Content-Type → `ContentMismatch`
/// 5. Otherwise read the body as text
///
/// No retries are attempted; callers skip failed pages and move on.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `user_agent` - The identity to present
/// * `timeout` - Upper bound on the whole request
/// * `cancel` - Cancellation signal
///
/// # Returns
///
/// A FetchResult indicating success or the type of failure
pub async fn fetch_page(
    client: &Client,
    url: &Url,
    user_agent: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> FetchResult {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => FetchResult::Cancelled,
        result = fetch_once(client, url, user_agent, timeout) => result,
    }
}

async fn fetch_once(client: &Client, url: &Url, user_agent: &str, timeout: Duration) -> FetchResult {
    let response = match client
        .get(url.clone())
        .header(USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    if let Some(ct) = content_type {
        if !is_textual(ct) {
            return FetchResult::ContentMismatch {
                content_type: ct.to_string(),
            };
        }
    }

    match response.text().await {
        Ok(body) => FetchResult::Success { final_url, body },
        Err(e) => classify_error(e),
    }
}

fn classify_error(e: reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };
    FetchResult::NetworkError { error }
}

/// Returns true for content types that can carry readable contact details
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.is_empty() || mime.starts_with("text/") || mime.contains("html") || mime.contains("xml")
}
