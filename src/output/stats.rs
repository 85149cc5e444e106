//! Run statistics
//!
//! Counters gathered while a run progresses, printed once it ends.

use crate::crawler::CrawlOutcome;
use crate::listing::Listing;
use crate::state::TaskState;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Summary of one run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Listings produced by discovery
    pub listings: usize,

    /// Listings that had no website to crawl
    pub without_website: usize,

    /// Crawl tasks by terminal state
    pub tasks_by_state: HashMap<TaskState, usize>,

    /// Pages dequeued across every crawl task
    pub pages_visited: u64,

    pub listings_with_email: usize,
    pub listings_with_phone: usize,
}

impl RunStatistics {
    /// Starts a statistics record at the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listings: 0,
            without_website: 0,
            tasks_by_state: HashMap::new(),
            pages_visited: 0,
            listings_with_email: 0,
            listings_with_phone: 0,
        }
    }

    pub fn record_outcome(&mut self, outcome: &CrawlOutcome) {
        *self.tasks_by_state.entry(outcome.state).or_insert(0) += 1;
        self.pages_visited += u64::from(outcome.pages_visited);
    }

    /// Counts the contact details an enriched listing ended up with
    pub fn record_listing(&mut self, listing: &Listing) {
        if let Some(contacts) = &listing.contacts {
            if contacts.has_email() {
                self.listings_with_email += 1;
            }
            if contacts.has_phone() {
                self.listings_with_phone += 1;
            }
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of crawl tasks that ended in `state`
    pub fn tasks(&self, state: TaskState) -> usize {
        self.tasks_by_state.get(&state).copied().unwrap_or(0)
    }

    pub fn total_tasks(&self) -> usize {
        self.tasks_by_state.values().sum()
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Run Statistics ===\n");

    println!("Overview:");
    println!("  Listings: {}", stats.listings);
    println!("  Without website: {}", stats.without_website);
    println!("  Websites crawled: {}", stats.total_tasks());
    println!("  Pages visited: {}", stats.pages_visited);
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    if !stats.tasks_by_state.is_empty() {
        println!("Crawl Tasks by State:");
        for state in TaskState::terminal_states() {
            let count = stats.tasks(state);
            if count > 0 {
                println!("  {}: {}", state, count);
            }
        }
        println!();
    }

    let percentage = |count: usize| {
        if stats.listings > 0 {
            (count as f64 / stats.listings as f64) * 100.0
        } else {
            0.0
        }
    };

    println!(
        "Listings with email: {} ({:.1}%)",
        stats.listings_with_email,
        percentage(stats.listings_with_email)
    );
    println!(
        "Listings with phone: {} ({:.1}%)",
        stats.listings_with_phone,
        percentage(stats.listings_with_phone)
    );
}
