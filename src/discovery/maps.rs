//! Maps search discovery through a headless Chromium session
//!
//! The session opens the search results page, scrolls the results feed to
//! load enough entries, then opens each result in turn and reads the
//! business details from its panel.

use crate::config::DiscoveryConfig;
use crate::crawler::IdentityPool;
use crate::discovery::ListingSource;
use crate::listing::Listing;
use crate::orchestrator::EventSink;
use crate::retry::RetryPolicy;
use crate::ScoutError;
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

const COOKIE_BUTTON: &str = r#"[aria-label="Accept all"]"#;
const RESULT_FEED: &str = r#"div[role="feed"]"#;
const RESULT_LINK: &str = "a.hfpxzc";
const NAME: &str = "h1.DUwDvf";
const ADDRESS: &str = r#"[aria-label^="Address: "]"#;
const PHONE: &str = r#"[aria-label^="Phone: "]"#;
const WEBSITE: &str = r#"[aria-label^="Website: "]"#;
const OWNER: &str = r#"[data-item-id="owner"]"#;

/// Interval between element lookups while waiting for one to appear
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Builds the search page URL for a query
pub fn search_url(query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("{}{}", SEARCH_BASE, encoded)
}

/// Number of feed scrolls needed to load `max_results` entries
///
/// The feed loads about twenty entries per scroll; at least two scrolls are
/// always made.
pub fn scroll_rounds(max_results: usize) -> usize {
    (max_results / 20 + 1).max(2)
}

/// Extracts the value from an `aria-label` such as `Address: 1 Main St`
fn label_value(label: &str) -> String {
    label
        .split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

fn browser_error(e: impl std::fmt::Display) -> ScoutError {
    ScoutError::Browser(e.to_string())
}

/// Discovers listings from a maps search
pub struct MapsSource {
    config: DiscoveryConfig,
    identities: IdentityPool,
}

impl MapsSource {
    pub fn new(config: DiscoveryConfig, identities: IdentityPool) -> Self {
        Self { config, identities }
    }

    fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.config.step_timeout_ms)
    }

    fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.config.settle_delay_ms)
    }

    fn retry_policy(&self, cancel: &CancellationToken) -> RetryPolicy {
        RetryPolicy::new(
            self.config.retry_attempts,
            Duration::from_millis(self.config.retry_backoff_ms),
        )
        .with_cancellation(cancel.clone())
    }

    /// Launches Chromium and spawns its event handler
    async fn launch(&self) -> Result<(Browser, JoinHandle<()>), ScoutError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_millis(self.config.navigation_timeout_ms))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if self.config.non_headless {
            builder = builder.with_head();
        }

        let browser_config = builder.build().map_err(ScoutError::Browser)?;
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(browser_error)?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    async fn collect(
        &self,
        browser: &Browser,
        query: &str,
        max_results: usize,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>, ScoutError> {
        let page = browser.new_page("about:blank").await.map_err(browser_error)?;

        if let Err(e) = page.set_user_agent(self.identities.pick()).await {
            tracing::warn!("Failed to set browser user agent: {}", e);
        }

        let url = search_url(query);
        events.log(format!("Searching Google Maps for '{}'", query.trim()));
        tracing::info!("Opening {}", url);

        let navigation_timeout = Duration::from_millis(self.config.navigation_timeout_ms);
        let page_ref = &page;
        let url_ref = url.as_str();
        let navigated = self
            .retry_policy(cancel)
            .run("Maps search navigation", |_| async move {
                match tokio::time::timeout(navigation_timeout, page_ref.goto(url_ref)).await {
                    Ok(Ok(_)) => Ok(()),
                    Ok(Err(e)) => Err(browser_error(e)),
                    Err(_) => Err(ScoutError::Timeout {
                        url: url_ref.to_string(),
                    }),
                }
            })
            .await;

        if let Err(e) = navigated {
            if cancel.is_cancelled() {
                return Err(ScoutError::Cancelled);
            }
            return Err(ScoutError::Discovery(format!(
                "could not open search results: {}",
                e
            )));
        }

        tokio::time::sleep(self.settle_delay()).await;
        self.accept_cookies(&page).await;
        self.load_results(&page, max_results).await;

        let found = page.find_elements(RESULT_LINK).await.unwrap_or_default().len();
        let total = found.min(max_results);
        tracing::info!("Found {} results, reading {}", found, total);
        events.log(format!("Found {} results", found));

        let mut listings = Vec::with_capacity(total);
        for index in 0..total {
            if cancel.is_cancelled() {
                return Err(ScoutError::Cancelled);
            }

            let this = self;
            let result = self
                .retry_policy(cancel)
                .run(&format!("Reading result {}", index + 1), |_| async move {
                    this.read_result(page_ref, index).await
                })
                .await;

            match result {
                Ok(listing) => {
                    events.log(format!("Found listing: {}", listing.name));
                    listings.push(listing);
                }
                Err(e) => {
                    events.log(format!("Skipping result {}: {}", index + 1, e));
                }
            }

            events.discovery_progress(index + 1, total);
        }

        if total == 0 {
            events.discovery_progress(1, 1);
        }

        Ok(listings)
    }

    async fn accept_cookies(&self, page: &Page) {
        if let Some(button) = wait_for(page, COOKIE_BUTTON, self.step_timeout()).await {
            match button.click().await {
                Ok(_) => tokio::time::sleep(self.settle_delay()).await,
                Err(e) => tracing::debug!("Cookie banner click failed: {}", e),
            }
        }
    }

    /// Scrolls the results feed so enough entries are loaded
    async fn load_results(&self, page: &Page, max_results: usize) {
        if wait_for(page, RESULT_FEED, self.step_timeout()).await.is_none() {
            tracing::warn!("Results feed not found; reading what is visible");
            return;
        }

        let script = format!(
            "(() => {{ const feed = document.querySelector('{}'); if (feed) {{ feed.scrollTop = feed.scrollHeight; }} return !!feed; }})()",
            RESULT_FEED
        );

        for round in 0..scroll_rounds(max_results) {
            if let Err(e) = page.evaluate(script.as_str()).await {
                tracing::debug!("Feed scroll {} failed: {}", round + 1, e);
                break;
            }
            tokio::time::sleep(Duration::from_millis(self.config.scroll_pause_ms)).await;
        }
    }

    /// Opens result `index`, reads its panel and returns to the results list
    async fn read_result(&self, page: &Page, index: usize) -> Result<Listing, ScoutError> {
        let links = page.find_elements(RESULT_LINK).await.map_err(browser_error)?;
        let link = links.get(index).ok_or_else(|| {
            ScoutError::Discovery(format!("result {} is no longer listed", index + 1))
        })?;

        link.click().await.map_err(browser_error)?;
        tokio::time::sleep(self.settle_delay()).await;

        let step = self.step_timeout();
        let name = read_text(page, NAME, step).await;
        let address = read_attribute(page, ADDRESS, "aria-label", step)
            .await
            .map(|label| label_value(&label))
            .unwrap_or_default();
        let phone = read_attribute(page, PHONE, "aria-label", step)
            .await
            .map(|label| label_value(&label))
            .unwrap_or_default();
        let website = read_attribute(page, WEBSITE, "href", step)
            .await
            .unwrap_or_default();
        let contact_name = read_text(page, OWNER, step).await.unwrap_or_default();

        page.evaluate("window.history.back()")
            .await
            .map_err(browser_error)?;
        if wait_for(page, RESULT_LINK, step).await.is_none() {
            tracing::debug!("Results list slow to reappear after result {}", index + 1);
        }

        let name = name.ok_or_else(|| {
            ScoutError::Discovery(format!("no business name on result {}", index + 1))
        })?;

        Ok(Listing {
            name,
            address,
            phone,
            website,
            contact_name,
            email: String::new(),
            contacts: None,
        })
    }
}

#[async_trait]
impl ListingSource for MapsSource {
    async fn discover(
        &mut self,
        query: &str,
        max_results: usize,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>, ScoutError> {
        let (mut browser, handler) = self.launch().await?;

        let result = self
            .collect(&browser, query, max_results, events, cancel)
            .await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Browser did not close cleanly: {}", e);
        }
        handler.abort();

        result
    }
}

/// Polls for an element until it appears or `timeout` elapses
async fn wait_for(page: &Page, selector: &str, timeout: Duration) -> Option<Element> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Some(element);
        }
        if Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn read_text(page: &Page, selector: &str, timeout: Duration) -> Option<String> {
    let element = wait_for(page, selector, timeout).await?;
    let text = element.inner_text().await.ok()??;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

async fn read_attribute(
    page: &Page,
    selector: &str,
    attribute: &str,
    timeout: Duration,
) -> Option<String> {
    let element = wait_for(page, selector, timeout).await?;
    let value = element.attribute(attribute).await.ok()??;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
