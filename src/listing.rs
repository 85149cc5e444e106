//! Business listing records
//!
//! A listing is produced by discovery and later enriched with the contact
//! fields gathered from its website.

use crate::extract::ContactFields;
use serde::Serialize;

/// One business listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Website URL; empty when the listing has none
    pub website: String,
    pub contact_name: String,
    /// Contact email from the listing itself; discovery leaves it empty
    pub email: String,
    /// Contact fields from the website crawl, once it has run
    pub contacts: Option<ContactFields>,
}

impl Listing {
    /// Creates a listing with just a name and website
    pub fn new(name: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: website.into(),
            ..Default::default()
        }
    }

    /// Returns the website when it is non-blank
    pub fn website_url(&self) -> Option<&str> {
        let website = self.website.trim();
        (!website.is_empty()).then_some(website)
    }

    /// Flattens the listing into one output table row
    pub fn to_row(&self) -> ListingRow<'_> {
        let (emails, website_addresses, phones, social_media) = match &self.contacts {
            Some(fields) => (
                fields.emails.as_str(),
                fields.addresses.as_str(),
                fields.phones.as_str(),
                fields.social_media.as_str(),
            ),
            None => ("", "", "", ""),
        };

        ListingRow {
            name: &self.name,
            address: &self.address,
            phone: &self.phone,
            website: &self.website,
            contact_name: &self.contact_name,
            email: &self.email,
            emails,
            website_addresses,
            phones,
            social_media,
        }
    }
}

/// One row of the output table, in column order
#[derive(Debug, Serialize)]
pub struct ListingRow<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub phone: &'a str,
    pub website: &'a str,
    pub contact_name: &'a str,
    pub email: &'a str,
    pub emails: &'a str,
    pub website_addresses: &'a str,
    pub phones: &'a str,
    pub social_media: &'a str,
}
