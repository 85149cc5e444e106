//! CSV results table

use crate::listing::Listing;
use crate::output::error::{OutputError, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names, in output order
pub const CSV_HEADER: [&str; 10] = [
    "name",
    "address",
    "phone",
    "website",
    "contact_name",
    "email",
    "emails",
    "website_addresses",
    "phones",
    "social_media",
];

/// Writes listings as CSV rows under a fixed header
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Creates (or truncates) the file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps a writer and emits the header row
    pub fn from_writer(inner: W) -> OutputResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(CSV_HEADER)?;
        Ok(Self { writer })
    }

    /// Writes listings in the order given
    pub fn write_listings(&mut self, listings: &[Listing]) -> OutputResult<()> {
        for listing in listings {
            self.writer.serialize(listing.to_row())?;
        }
        Ok(())
    }

    /// Flushes buffered rows
    pub fn finish(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Io(e.into_error()))
    }
}

/// Writes the full results table to `path`
pub fn write_listings_csv(path: &Path, listings: &[Listing]) -> OutputResult<()> {
    let mut sink = CsvSink::create(path)?;
    sink.write_listings(listings)?;
    sink.finish()?;
    tracing::info!("Wrote {} listings to {}", listings.len(), path.display());
    Ok(())
}
