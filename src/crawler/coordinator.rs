//! Crawl-and-aggregate engine
//!
//! This module contains the per-website crawl loop, which coordinates:
//! - The robots.txt policy gate
//! - Breadth-first traversal bounded by depth, page budget and host scope
//! - Fetching, parsing and entity extraction for each page
//! - The politeness delay between pages
//! - Cancellation
//!
//! A task never fails: every page-level error is logged and skipped, and the
//! task always produces a well-formed set of contact fields.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchResult, IdentityPool};
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::Frontier;
use crate::extract::{ContactAggregate, ContactFields, EntityExtractor};
use crate::orchestrator::{EventSink, ProgressEvent};
use crate::robots::is_crawl_allowed;
use crate::state::TaskState;
use crate::url::{host_scope, normalize_url};
use crate::ScoutError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// One website to crawl on behalf of one listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Position of the listing this task enriches
    pub listing_index: usize,
    /// The listing's website; blank means the listing has none
    pub seed_url: String,
    pub max_depth: u32,
    pub max_pages: u32,
    pub check_robots: bool,
}

impl CrawlTask {
    /// Creates a task using the crawl limits from configuration
    pub fn from_config(
        listing_index: usize,
        seed_url: impl Into<String>,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            listing_index,
            seed_url: seed_url.into(),
            max_depth: config.max_depth,
            max_pages: config.max_pages,
            check_robots: config.check_robots,
        }
    }
}

/// Result of one crawl task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub listing_index: usize,
    pub state: TaskState,
    /// Pages dequeued for fetching, successful or not
    pub pages_visited: u32,
    pub fields: ContactFields,
}

/// Crawls websites and aggregates the contact details found on them
///
/// The engine holds only immutable configuration and shared handles, so one
/// instance serves any number of concurrent tasks.
pub struct CrawlEngine {
    client: Client,
    extractor: Arc<EntityExtractor>,
    identities: IdentityPool,
    fetch_timeout: Duration,
    robots_timeout: Duration,
    politeness_delay: Duration,
    events: EventSink,
    cancel: CancellationToken,
}

impl CrawlEngine {
    /// Creates an engine from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `events` - Where progress and log events are sent
    /// * `cancel` - Stops traversal when triggered
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - Ready to run tasks
    /// * `Err(ScoutError)` - The HTTP client, extraction patterns or identity
    ///   pool could not be set up
    pub fn new(
        config: &Config,
        events: EventSink,
        cancel: CancellationToken,
    ) -> Result<Self, ScoutError> {
        let client = build_http_client(&config.crawler)?;
        let extractor = Arc::new(EntityExtractor::new()?);
        let identities = IdentityPool::from_config(&config.user_agent)?;

        Ok(Self {
            client,
            extractor,
            identities,
            fetch_timeout: Duration::from_secs(config.crawler.fetch_timeout_secs),
            robots_timeout: Duration::from_secs(config.crawler.robots_timeout_secs),
            politeness_delay: Duration::from_millis(config.crawler.politeness_delay_ms),
            events,
            cancel,
        })
    }

    /// Runs one crawl task to a terminal state
    ///
    /// # Flow
    ///
    /// 1. Blank seed → `No website` sentinel
    /// 2. robots.txt blanket denial (when checked) → robots sentinel
    /// 3. Breadth-first traversal from the seed at depth 0
    /// 4. Render the aggregate into the four output fields
    pub async fn run(&self, task: &CrawlTask) -> CrawlOutcome {
        let seed = task.seed_url.trim();
        let state = TaskState::Init;

        if seed.is_empty() {
            let state = advance(state, TaskState::Skipped);
            return self.finish(task, state, 0, ContactFields::no_website());
        }

        let identity = self.identities.pick();

        if task.check_robots
            && !is_crawl_allowed(&self.client, seed, identity, self.robots_timeout).await
        {
            self.events
                .log(format!("Robots.txt disallows scraping {}", seed));
            let state = advance(state, TaskState::Skipped);
            return self.finish(task, state, 0, ContactFields::robots_disallowed());
        }

        let state = advance(state, TaskState::Running);

        let seed_url = match normalize_url(seed) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot crawl website '{}': {}", seed, e);
                self.events
                    .log(format!("Error scraping website {}: {}", seed, e));
                let state = advance(state, TaskState::Completed);
                return self.finish(task, state, 0, ContactFields::not_found());
            }
        };

        tracing::info!("Crawling {} for listing {}", seed_url, task.listing_index);
        let (aggregate, end_state, pages_visited) =
            self.traverse(task, seed_url, identity).await;
        let state = advance(state, end_state);

        if aggregate.is_empty() {
            tracing::debug!("No contact details found for listing {}", task.listing_index);
        }

        self.finish(task, state, pages_visited, aggregate.to_fields())
    }

    /// Breadth-first traversal; returns the aggregate, the terminal state and
    /// the number of pages dequeued
    async fn traverse(
        &self,
        task: &CrawlTask,
        seed_url: Url,
        identity: &str,
    ) -> (ContactAggregate, TaskState, u32) {
        let scope = host_scope(&seed_url);
        let mut frontier = Frontier::new(task.max_depth, task.max_pages);
        let mut aggregate = ContactAggregate::default();
        let mut cancelled = false;

        frontier.push(seed_url, 0);

        loop {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let Some(queued) = frontier.next_url() else {
                break;
            };

            let count = frontier.pages_visited();
            tracing::debug!(
                "Visiting {} (depth {}, page {}/{})",
                queued.url,
                queued.depth,
                count,
                task.max_pages
            );
            self.events.log(format!(
                "Visiting website page: {} ({}/{})",
                queued.url, count, task.max_pages
            ));
            self.events.send(ProgressEvent::PageVisited {
                listing: task.listing_index,
                url: queued.url.to_string(),
                count,
                max_pages: task.max_pages,
            });

            match fetch_page(
                &self.client,
                &queued.url,
                identity,
                self.fetch_timeout,
                &self.cancel,
            )
            .await
            {
                FetchResult::Success { final_url, body } => {
                    let page = parse_html(&body, &final_url);
                    aggregate.merge(self.extractor.extract(&page.text, &page.hrefs));

                    if queued.depth < task.max_depth {
                        for link in &page.links {
                            match normalize_url(link) {
                                Ok(url) if host_scope(&url) == scope => {
                                    frontier.push(url, queued.depth + 1);
                                }
                                Ok(_) => tracing::trace!("Out of scope: {}", link),
                                Err(e) => tracing::trace!("Dropping link {}: {}", link, e),
                            }
                        }
                    }

                    if !self.pause().await {
                        cancelled = true;
                        break;
                    }
                }
                FetchResult::Cancelled => {
                    cancelled = true;
                    break;
                }
                FetchResult::HttpError { status_code } => {
                    tracing::debug!("HTTP {} for {}", status_code, queued.url);
                    self.events.log(format!(
                        "Error scraping website page {}: HTTP {}",
                        queued.url, status_code
                    ));
                }
                FetchResult::ContentMismatch { content_type } => {
                    tracing::debug!("Skipping {} ({})", queued.url, content_type);
                }
                FetchResult::NetworkError { error, .. } => {
                    tracing::debug!("Network error for {}: {}", queued.url, error);
                    self.events.log(format!(
                        "Error scraping website page {}: {}",
                        queued.url, error
                    ));
                }
            }
        }

        let state = if cancelled {
            TaskState::Cancelled
        } else if frontier.budget_exhausted() && frontier.has_unvisited() {
            TaskState::BudgetExhausted
        } else {
            TaskState::Completed
        };

        (aggregate, state, frontier.pages_visited())
    }

    /// Waits out the politeness delay; returns false if cancelled meanwhile
    async fn pause(&self) -> bool {
        if self.politeness_delay.is_zero() {
            return !self.cancel.is_cancelled();
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.politeness_delay) => true,
        }
    }

    fn finish(
        &self,
        task: &CrawlTask,
        state: TaskState,
        pages_visited: u32,
        fields: ContactFields,
    ) -> CrawlOutcome {
        debug_assert!(state.is_terminal(), "task finished in {:?}", state);
        tracing::debug!(
            "Task for listing {} finished: {} ({} pages)",
            task.listing_index,
            state,
            pages_visited
        );
        self.events.send(ProgressEvent::TaskFinished {
            listing: task.listing_index,
            state,
            pages_visited,
        });

        CrawlOutcome {
            listing_index: task.listing_index,
            state,
            pages_visited,
            fields,
        }
    }
}

/// Applies a lifecycle transition; the engine only issues valid ones
fn advance(from: TaskState, to: TaskState) -> TaskState {
    from.transition(to).unwrap_or_else(|e| {
        tracing::error!("{}", e);
        to
    })
}
