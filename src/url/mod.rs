//! URL handling module for Listing Scout
//!
//! This module provides URL normalization (the keys of a crawl's visited set)
//! and host-scope extraction (the boundary a crawl never leaves).

mod domain;
mod normalize;

pub use domain::{host_scope, same_scope};
pub use normalize::normalize_url;
