//! Contact entity extraction
//!
//! - `EntityExtractor`: pulls emails, phones, addresses and social links out
//!   of a page's visible text and raw link targets
//! - `ContactAggregate`: the union of everything found across a website
//! - `ContactFields`: the four rendered output fields, including the
//!   "No website" and robots.txt sentinels

mod aggregate;
mod extractor;

pub use aggregate::{ContactAggregate, ContactFields, NOT_FOUND, NO_WEBSITE, ROBOTS_DISALLOWED};
pub use extractor::EntityExtractor;
