//! Crawl frontier for a single website
//!
//! This module handles:
//! - FIFO ordering of URLs to visit (breadth-first by depth)
//! - De-duplication against the set of visited URLs
//! - The depth limit
//! - The per-website page budget

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL queued for fetching with its link distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Number of link hops from the seed page (seed is 0)
    pub depth: u32,
}

/// Breadth-first frontier with visited tracking and a page budget
///
/// A URL may be queued more than once; only its first dequeue counts and
/// later copies are discarded, so each URL is visited at the depth it was
/// first reached at.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,
    visited: HashSet<String>,
    max_depth: u32,
    max_pages: u32,
    pages_visited: u32,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_depth` - URLs deeper than this are never visited
    /// * `max_pages` - Upper bound on dequeued URLs
    pub fn new(max_depth: u32, max_pages: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
            max_pages,
            pages_visited: 0,
        }
    }

    /// Queues a URL at the given depth
    ///
    /// Returns false when the URL is dropped because it is too deep or has
    /// already been visited.
    pub fn push(&mut self, url: Url, depth: u32) -> bool {
        if depth > self.max_depth || self.visited.contains(url.as_str()) {
            return false;
        }
        self.queue.push_back(QueuedUrl { url, depth });
        true
    }

    /// Takes the next URL to visit and marks it visited
    ///
    /// Returns None once the frontier is drained or the page budget is spent.
    pub fn next_url(&mut self) -> Option<QueuedUrl> {
        while self.pages_visited < self.max_pages {
            let queued = self.queue.pop_front()?;

            if queued.depth > self.max_depth {
                continue;
            }
            if !self.visited.insert(queued.url.as_str().to_string()) {
                continue;
            }

            self.pages_visited += 1;
            return Some(queued);
        }
        None
    }

    /// Number of URLs dequeued for fetching so far
    pub fn pages_visited(&self) -> u32 {
        self.pages_visited
    }

    /// Returns true if the page budget has been spent
    pub fn budget_exhausted(&self) -> bool {
        self.pages_visited >= self.max_pages
    }

    /// Returns true if a queued URL would still be visited given more budget
    pub fn has_unvisited(&self) -> bool {
        self.queue
            .iter()
            .any(|q| q.depth <= self.max_depth && !self.visited.contains(q.url.as_str()))
    }
}
