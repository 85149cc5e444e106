//! HTML parser for extracting page text and links
//!
//! This module turns fetched markup into:
//! - The visible text, which the entity extractor scans
//! - Raw anchor targets, which carry `mailto:`, `tel:` and social links
//! - Absolute crawlable links, which feed the frontier
//!
//! Malformed markup is parsed leniently and never fails.

use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Elements whose contents never render as text
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Visible text, text nodes joined by single spaces
    pub text: String,

    /// Every anchor `href` value, trimmed but unresolved
    pub hrefs: Vec<String>,

    /// Crawlable links resolved to absolute http(s) URLs
    pub links: Vec<String>,
}

/// Parses HTML content and extracts text and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document
///
/// **Exclude from `links`** (still reported in `hrefs`):
/// - `javascript:`, `mailto:`, `tel:` and `data:` targets
/// - Fragment-only links
/// - `<a href="..." download>`
/// - Anything that is not http(s) after resolution
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The base URL for resolving relative links
///
/// # Returns
///
/// The parsed page
///
/// # Example
///
/// ```
/// use listing_scout::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><p>Call us</p><a href="/contact">Contact</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.text, "Call us Contact");
/// assert_eq!(parsed.links, vec!["https://example.com/contact".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    let text = extract_visible_text(&document);
    let (hrefs, links) = extract_anchors(&document, base_url);

    ParsedPage { text, hrefs, links }
}

/// Collects text nodes outside hidden elements
fn extract_visible_text(document: &Html) -> String {
    let mut parts = Vec::new();
    collect_text(document.root_element(), &mut parts);
    parts.join(" ")
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            Node::Element(el) => {
                if HIDDEN_ELEMENTS.contains(&el.name()) {
                    continue;
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, parts);
                }
            }
            _ => {}
        }
    }
}

/// Returns the raw anchor targets and the crawlable links among them
fn extract_anchors(document: &Html, base_url: &Url) -> (Vec<String>, Vec<String>) {
    let mut hrefs = Vec::new();
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let href = href.trim();
            if href.is_empty() {
                continue;
            }
            hrefs.push(href.to_string());

            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(absolute_url) = resolve_link(href, base_url) {
                links.push(absolute_url);
            }
        }
    }

    (hrefs, links)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should not be followed:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    // Same page anchors
    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
