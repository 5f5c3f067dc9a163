//! URL handling module for Site-Harvest
//!
//! This module provides start-URL validation, authority extraction, base-path
//! detection and resource-type filtering.

mod domain;
mod normalize;

pub use domain::{extract_authority, extract_domain, origin_of};
pub use normalize::{extract_base_path, normalize_start_url};

/// File extensions that are never HTML pages
const NON_HTML_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".woff", ".woff2", ".ttf",
    ".eot", ".zip", ".tar", ".gz", ".pdf", ".xml", ".json", ".txt",
];

/// Returns true if the URL points to a non-HTML asset, judged by extension
///
/// The check runs against the whole URL string (case-insensitive), so a query
/// string hides the extension: `/logo.png?v=2` is treated as a page and left
/// to the Content-Type check.
///
/// # Examples
///
/// ```
/// use site_harvest::url::is_non_html_resource;
///
/// assert!(is_non_html_resource("https://example.com/static/app.JS"));
/// assert!(!is_non_html_resource("https://example.com/docs/intro"));
/// ```
pub fn is_non_html_resource(url: &str) -> bool {
    let lower = url.to_lowercase();
    NON_HTML_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
