//! Crawler module for website fetching and contact aggregation
//!
//! This module contains the per-website crawling logic, including:
//! - HTTP fetching with identity rotation
//! - HTML parsing into visible text and links
//! - The breadth-first frontier with its page budget
//! - The crawl-and-aggregate engine that ties them together

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{CrawlEngine, CrawlOutcome, CrawlTask};
pub use fetcher::{build_http_client, fetch_page, FetchResult, IdentityPool};
pub use parser::{parse_html, ParsedPage};
pub use scheduler::{Frontier, QueuedUrl};
