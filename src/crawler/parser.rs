//! HTML parser for extracting links and language alternates
//!
//! This module handles parsing decoded HTML to extract:
//! - Links to follow (from `<a href>` tags)
//! - hreflang alternates (from `<link rel="alternate">`)

use crate::locale::extract_hreflang;
use scraper::{Html, Selector};
use std::collections::HashMap;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// All followable links found on the page (absolute, fragment removed)
    pub links: Vec<String>,

    /// hreflang code (lower-case) to href, as declared by the page
    pub hreflang: HashMap<String, String>,
}

/// Parses HTML content and extracts links and hreflang alternates
///
/// # Arguments
///
/// * `html` - The decoded HTML content
/// * `base_url` - The URL the page was fetched from, for resolving relative links
///
/// # Example
///
/// ```
/// use site_harvest::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page#top">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document, base_url),
        hreflang: extract_hreflang(&document),
    }
}

/// Extracts followable links from `<a>` elements in document order
///
/// # Link Extraction Rules
///
/// **Skipped:**
/// - Empty and fragment-only hrefs (same page anchors)
/// - `javascript:`, `mailto:`, `tel:` and `data:` hrefs
/// - Anything resolving to a scheme other than http/https
/// - Hrefs that fail to resolve against the base URL
///
/// Fragments are stripped from the resolved URL. Duplicates are kept; the
/// crawler deduplicates.
pub fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }

    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}
