//! Run orchestration
//!
//! A run has two stages:
//! 1. Discovery collects listings for the query (progress 0-50%)
//! 2. Every listing with a website gets one crawl task; tasks run
//!    concurrently on a bounded worker pool (progress 50-100%)
//!
//! Results are merged back by listing position, so the output order always
//! matches discovery order regardless of which task finishes first.

mod events;

pub use events::{EventSink, ProgressEvent, DISCOVERY_SHARE};

use crate::config::{validate_query, Config};
use crate::crawler::{CrawlEngine, CrawlTask};
use crate::discovery::ListingSource;
use crate::extract::ContactFields;
use crate::listing::Listing;
use crate::output::RunStatistics;
use crate::ScoutError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Listings of a finished run together with its statistics
#[derive(Debug, Clone)]
pub struct RunReport {
    pub listings: Vec<Listing>,
    pub statistics: RunStatistics,
}

/// Drives discovery and the crawl stage for one run
pub struct Orchestrator {
    config: Config,
    events: EventSink,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: Config, events: EventSink, cancel: CancellationToken) -> Self {
        Self {
            config,
            events,
            cancel,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs discovery for `query`, then enriches every listing found
    ///
    /// # Returns
    ///
    /// * `Ok(RunReport)` - Listings in discovery order, each with contacts
    /// * `Err(ScoutError)` - Invalid query, discovery failure or cancellation
    ///   during discovery; no crawl is started in these cases
    pub async fn run<S>(&self, source: &mut S, query: &str) -> crate::Result<RunReport>
    where
        S: ListingSource + ?Sized,
    {
        validate_query(query)?;

        self.events.progress(0.0);
        let listings = source
            .discover(
                query,
                self.config.discovery.max_results as usize,
                &self.events,
                &self.cancel,
            )
            .await?;

        tracing::info!("Discovered {} listings for '{}'", listings.len(), query.trim());
        self.events.discovery_progress(1, 1);

        if self.cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }

        self.enrich(listings).await
    }

    /// Crawls the website of every listing and attaches the contact fields
    ///
    /// Listings without a website are marked immediately and never reach
    /// the worker pool. A crawl task that panics leaves its listing without
    /// contact fields; the rest of the run is unaffected.
    pub async fn enrich(&self, mut listings: Vec<Listing>) -> crate::Result<RunReport> {
        let mut statistics = RunStatistics::start();
        statistics.listings = listings.len();

        let engine = Arc::new(CrawlEngine::new(
            &self.config,
            self.events.clone(),
            self.cancel.clone(),
        )?);
        let semaphore = Arc::new(Semaphore::new(self.config.crawler.workers.max(1)));
        let mut tasks = JoinSet::new();

        for (index, listing) in listings.iter_mut().enumerate() {
            let website = listing.website_url().map(str::to_string);
            match website {
                Some(website) => {
                    let task = CrawlTask::from_config(index, website, &self.config.crawler);
                    let engine = Arc::clone(&engine);
                    let semaphore = Arc::clone(&semaphore);

                    tasks.spawn(async move {
                        // The semaphore is never closed
                        let _permit = semaphore.acquire_owned().await.ok();
                        engine.run(&task).await
                    });
                }
                None => {
                    tracing::debug!("Listing {} ({}) has no website", index, listing.name);
                    listing.contacts = Some(ContactFields::no_website());
                    statistics.without_website += 1;
                }
            }
        }

        let total = listings.len();
        let mut done = statistics.without_website;
        tracing::info!(
            "Crawling {} websites with {} workers",
            tasks.len(),
            self.config.crawler.workers
        );

        if tasks.is_empty() {
            self.events.crawl_progress(total, total);
        } else if done > 0 {
            self.events.crawl_progress(done, total);
        }

        while let Some(joined) = tasks.join_next().await {
            done += 1;
            match joined {
                Ok(outcome) => {
                    statistics.record_outcome(&outcome);
                    if let Some(listing) = listings.get_mut(outcome.listing_index) {
                        listing.contacts = Some(outcome.fields);
                    }
                }
                Err(e) => {
                    tracing::error!("Crawl task failed: {}", e);
                    self.events.log(format!("Crawl task failed: {}", e));
                }
            }
            self.events.crawl_progress(done, total);
        }

        for listing in &listings {
            statistics.record_listing(listing);
        }
        statistics.finish();

        if self.cancel.is_cancelled() {
            self.events.log("Run cancelled; partial results kept");
        } else {
            self.events.log("Scraping completed");
        }

        Ok(RunReport {
            listings,
            statistics,
        })
    }
}
