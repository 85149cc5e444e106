//! Listing Scout: contact enrichment for local business listings
//!
//! This crate discovers business listings for a search query and enriches each
//! listing's website with contact details (emails, postal addresses, phone
//! numbers, social profile links) gathered by a small, polite, same-host crawl.

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod extract;
pub mod listing;
pub mod orchestrator;
pub mod output;
pub mod retry;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Listing Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Listing discovery failed: {0}")]
    Discovery(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::TaskState,
        to: state::TaskState,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to parse settings document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Listing Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

// Re-export commonly used types
pub use config::{Config, Settings};
pub use crawler::{CrawlEngine, CrawlOutcome, CrawlTask};
pub use extract::{ContactAggregate, ContactFields, EntityExtractor};
pub use listing::Listing;
pub use orchestrator::{EventSink, Orchestrator, ProgressEvent, RunReport};
pub use state::TaskState;
pub use url::{host_scope, normalize_url};
