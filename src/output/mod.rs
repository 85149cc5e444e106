//! Output module for run results
//!
//! This module handles:
//! - Writing enriched listings as a CSV table
//! - Recording and printing run statistics

mod csv_writer;
mod error;
pub mod stats;

pub use csv_writer::{write_listings_csv, CsvSink, CSV_HEADER};
pub use stats::{print_statistics, RunStatistics};
pub use error::{OutputError, OutputResult};
