use serde::Serialize;
use std::collections::BTreeSet;

/// Placeholder for an aggregate with no entries
pub const NOT_FOUND: &str = "Not found";
/// First field when a listing has no website
pub const NO_WEBSITE: &str = "No website";
/// First field when robots.txt forbids crawling the website
pub const ROBOTS_DISALLOWED: &str = "Robots.txt disallows scraping";

const FIELD_SEPARATOR: &str = "; ";

/// Contact entities gathered for one page or one whole website
///
/// Each kind is held in a sorted set, so merging is idempotent and the
/// rendered fields do not depend on the order pages were visited in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactAggregate {
    emails: BTreeSet<String>,
    addresses: BTreeSet<String>,
    phones: BTreeSet<String>,
    social_links: BTreeSet<String>,
}

impl ContactAggregate {
    pub fn insert_email(&mut self, email: String) {
        insert_non_empty(&mut self.emails, email);
    }

    pub fn insert_address(&mut self, address: String) {
        insert_non_empty(&mut self.addresses, address);
    }

    pub fn insert_phone(&mut self, phone: String) {
        insert_non_empty(&mut self.phones, phone);
    }

    pub fn insert_social(&mut self, link: String) {
        insert_non_empty(&mut self.social_links, link);
    }

    /// Unions another aggregate into this one
    pub fn merge(&mut self, other: ContactAggregate) {
        self.emails.extend(other.emails);
        self.addresses.extend(other.addresses);
        self.phones.extend(other.phones);
        self.social_links.extend(other.social_links);
    }

    pub fn emails(&self) -> &BTreeSet<String> {
        &self.emails
    }

    pub fn addresses(&self) -> &BTreeSet<String> {
        &self.addresses
    }

    pub fn phones(&self) -> &BTreeSet<String> {
        &self.phones
    }

    pub fn social_links(&self) -> &BTreeSet<String> {
        &self.social_links
    }

    /// Returns true if nothing has been found
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.addresses.is_empty()
            && self.phones.is_empty()
            && self.social_links.is_empty()
    }

    /// Renders the four output fields
    ///
    /// Each set is joined with `"; "` in lexicographic order, or rendered as
    /// `Not found` when empty.
    pub fn to_fields(&self) -> ContactFields {
        ContactFields {
            emails: join_or_not_found(&self.emails),
            addresses: join_or_not_found(&self.addresses),
            phones: join_or_not_found(&self.phones),
            social_media: join_or_not_found(&self.social_links),
        }
    }
}

fn insert_non_empty(set: &mut BTreeSet<String>, value: String) {
    if !value.is_empty() {
        set.insert(value);
    }
}

fn join_or_not_found(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        NOT_FOUND.to_string()
    } else {
        set.iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(FIELD_SEPARATOR)
    }
}

/// The four contact fields reported for a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactFields {
    pub emails: String,
    pub addresses: String,
    pub phones: String,
    pub social_media: String,
}

impl ContactFields {
    /// Fields for a crawl that found nothing
    pub fn not_found() -> Self {
        ContactAggregate::default().to_fields()
    }

    /// Sentinel fields for a listing without a website
    pub fn no_website() -> Self {
        Self::sentinel(NO_WEBSITE)
    }

    /// Sentinel fields for a website whose robots.txt forbids crawling
    pub fn robots_disallowed() -> Self {
        Self::sentinel(ROBOTS_DISALLOWED)
    }

    fn sentinel(reason: &str) -> Self {
        Self {
            emails: reason.to_string(),
            addresses: NOT_FOUND.to_string(),
            phones: NOT_FOUND.to_string(),
            social_media: NOT_FOUND.to_string(),
        }
    }

    /// Returns true if at least one email was found
    pub fn has_email(&self) -> bool {
        is_found(&self.emails)
    }

    /// Returns true if at least one phone number was found
    pub fn has_phone(&self) -> bool {
        is_found(&self.phones)
    }
}

fn is_found(field: &str) -> bool {
    !field.is_empty() && field != NOT_FOUND && field != NO_WEBSITE && field != ROBOTS_DISALLOWED
}
