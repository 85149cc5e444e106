//! Regex-driven contact entity extraction
//!
//! Extraction is pure: the same text and links always produce the same
//! entities. Values are normalized before insertion so that trivially
//! different spellings of one entity collapse into one.

use crate::extract::aggregate::ContactAggregate;
use regex::Regex;

const EMAIL_PATTERN: &str = r"(?i)[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}";

// Optional country code (a leading `+` is kept), area code with or without
// parentheses, then the local number
const PHONE_PATTERN: &str =
    r"(?:(?:\+|\b)\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\b\d{3})[-.\s]?\d{3}[-.\s]?\d{4}\b";

// Street number, street (optional type suffix), city, region code, postal
// token. Matching ignores case; the postal token and any extension must
// contain a digit so trailing words are not swallowed.
const ADDRESS_PATTERN: &str = r"(?i)\b\d{1,5}\s+[\w\s.-]+?(?:St|Street|Ave|Avenue|Rd|Road|Blvd|Boulevard|Ln|Lane|Strasse|Rue|Av|Plaza)?\.?,\s+[\w\s.-]+?,\s+[A-Z]{2,}\s+[A-Z]{0,4}\d[A-Z0-9]{1,9}(?:[- ]\d[A-Z0-9]{2,3})?\b";

const SOCIAL_PATTERN: &str =
    r"(?i)^https?://(?:www\.)?(?:facebook|x|twitter|instagram|linkedin)\.com/[\w/-]+";

/// Digit counts a phone match must fall within
const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

/// Extracts emails, phones, postal addresses and social profile links
///
/// Compiled once and shared read-only by every crawl task.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    email_regex: Regex,
    phone_regex: Regex,
    address_regex: Regex,
    social_regex: Regex,
}

impl EntityExtractor {
    /// Compiles the extraction patterns
    ///
    /// # Returns
    ///
    /// * `Ok(EntityExtractor)` - Ready to use
    /// * `Err(regex::Error)` - A pattern failed to compile
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email_regex: Regex::new(EMAIL_PATTERN)?,
            phone_regex: Regex::new(PHONE_PATTERN)?,
            address_regex: Regex::new(ADDRESS_PATTERN)?,
            social_regex: Regex::new(SOCIAL_PATTERN)?,
        })
    }

    /// Extracts every entity from a page's visible text and raw link targets
    ///
    /// # Arguments
    ///
    /// * `text` - The page's visible text
    /// * `hrefs` - The page's raw anchor `href` values, unresolved
    ///
    /// # Returns
    ///
    /// The page's entities, de-duplicated per kind
    pub fn extract(&self, text: &str, hrefs: &[String]) -> ContactAggregate {
        let mut found = ContactAggregate::default();

        for email in self.extract_emails(text) {
            found.insert_email(email);
        }
        for phone in self.extract_phones(text) {
            found.insert_phone(phone);
        }
        for address in self.extract_addresses(text) {
            found.insert_address(address);
        }

        for href in hrefs {
            let href = href.trim();
            if let Some(email) = mailto_target(href) {
                found.insert_email(normalize_email(email));
            } else if let Some(phone) = tel_target(href) {
                found.insert_phone(normalize_spacing(phone));
            } else if self.social_regex.is_match(href) {
                found.insert_social(href.to_string());
            }
        }

        tracing::trace!(
            "Extracted {} emails, {} phones, {} addresses, {} social links",
            found.emails().len(),
            found.phones().len(),
            found.addresses().len(),
            found.social_links().len()
        );

        found
    }

    /// Extracts email addresses from text
    pub fn extract_emails(&self, text: &str) -> Vec<String> {
        self.email_regex
            .find_iter(text)
            .map(|m| normalize_email(m.as_str()))
            .collect()
    }

    /// Extracts phone numbers from text
    ///
    /// Matches outside the 10 to 15 digit range are discarded.
    pub fn extract_phones(&self, text: &str) -> Vec<String> {
        self.phone_regex
            .find_iter(text)
            .map(|m| normalize_phone(m.as_str()))
            .filter(|phone| {
                let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
                (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits)
            })
            .collect()
    }

    /// Extracts postal addresses from text
    pub fn extract_addresses(&self, text: &str) -> Vec<String> {
        self.address_regex
            .find_iter(text)
            .map(|m| normalize_spacing(m.as_str()))
            .collect()
    }
}

/// Returns the address of a `mailto:` link, without any query suffix
fn mailto_target(href: &str) -> Option<&str> {
    let prefix = href.get(..7)?;
    if !prefix.eq_ignore_ascii_case("mailto:") {
        return None;
    }
    let target = href[7..].split('?').next().unwrap_or_default().trim();
    (!target.is_empty()).then_some(target)
}

/// Returns the number of a `tel:` link
fn tel_target(href: &str) -> Option<&str> {
    let prefix = href.get(..4)?;
    if !prefix.eq_ignore_ascii_case("tel:") {
        return None;
    }
    let target = href[4..].trim();
    (!target.is_empty()).then_some(target)
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trims separators the phone pattern may capture at either edge
fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '-' || c == '.');
    normalize_spacing(trimmed)
}

/// Collapses runs of whitespace to single spaces and trims the ends
fn normalize_spacing(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
