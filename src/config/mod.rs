//! Configuration module for Listing Scout
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then an optional JSON settings document holding the four user-facing
//! tunables, then command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use listing_scout::config::{load_config, load_settings};
//! use std::path::Path;
//!
//! let mut config = load_config(Path::new("scout.toml")).unwrap();
//! load_settings(Path::new("settings.json")).unwrap().apply_to(&mut config);
//! println!("Crawling up to {} pages per website", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DiscoveryConfig, OutputConfig, Settings, UserAgentConfig,
    DEFAULT_USER_AGENTS,
};

// Re-export parser and validation functions
pub use parser::{load_config, load_settings, save_settings};
pub use validation::{high_load_warnings, validate, validate_query, validate_settings};
