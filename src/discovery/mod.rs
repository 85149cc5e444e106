//! Listing discovery
//!
//! Discovery turns a free-text search query into business listings. The
//! orchestrator depends only on the `ListingSource` trait:
//! - `MapsSource` drives a Chromium instance through a maps search
//! - `StaticListings` serves listings supplied up front

mod maps;

pub use maps::{scroll_rounds, search_url, MapsSource};

use crate::listing::Listing;
use crate::orchestrator::EventSink;
use crate::ScoutError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Produces the listings a run enriches
#[async_trait]
pub trait ListingSource: Send {
    /// Returns at most `max_results` listings for `query`, in listing order
    ///
    /// Progress is reported through `events` in the discovery share of the
    /// progress range. An error aborts the run before any crawl starts.
    async fn discover(
        &mut self,
        query: &str,
        max_results: usize,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>, ScoutError>;
}

/// A source that returns a fixed set of listings regardless of the query
#[derive(Debug, Clone, Default)]
pub struct StaticListings {
    listings: Vec<Listing>,
}

impl StaticListings {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }
}

#[async_trait]
impl ListingSource for StaticListings {
    async fn discover(
        &mut self,
        query: &str,
        max_results: usize,
        events: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>, ScoutError> {
        if cancel.is_cancelled() {
            return Err(ScoutError::Cancelled);
        }

        let listings: Vec<Listing> = self.listings.iter().take(max_results).cloned().collect();
        tracing::debug!("Serving {} static listings for '{}'", listings.len(), query);

        for done in 1..=listings.len() {
            events.discovery_progress(done, listings.len());
        }
        events.log(format!("Found {} listings", listings.len()));

        Ok(listings)
    }
}
