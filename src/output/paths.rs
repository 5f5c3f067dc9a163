//! Mapping between page URLs and files in the crawl directory
//!
//! Every saved page lives at `<crawl_dir>/<authority>/<path>` where the path
//! is derived deterministically from the URL path and query.

use crate::url::extract_authority;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use url::form_urlencoded;
use url::Url;

/// Computes the file a page is saved to
///
/// # Mapping Rules
///
/// - Each path segment is percent-decoded on its own; an encoded `/` stays
///   `%2F`, so `/a%2Fb` and `/a/b` map to different files. An empty path or
///   `/` becomes `/index`
/// - One trailing `/` is removed
/// - A non-empty query is re-encoded with keys sorted, `&` and `=` replaced
///   by `_`, `%` removed, and appended as `_q_<query>`
/// - `.html` is appended when the last segment has no extension
/// - `.` and `..` segments are dropped so the file stays under the authority
///
/// # Example
///
/// ```
/// use site_harvest::output::file_path_for;
/// use std::path::Path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/docs/?hl=ja&a=1").unwrap();
/// let path = file_path_for(Path::new("out/crawl"), &url);
/// assert_eq!(path, Path::new("out/crawl/example.com/docs_q_a_1_hl_ja.html"));
/// ```
pub fn file_path_for(crawl_dir: &Path, url: &Url) -> PathBuf {
    let decoded = url
        .path()
        .split('/')
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().replace('/', "%2F"))
        .collect::<Vec<_>>()
        .join("/");
    let mut path = if decoded.is_empty() || decoded == "/" {
        "/index".to_string()
    } else {
        decoded
    };

    if let Some(stripped) = path.strip_suffix('/') {
        path = stripped.to_string();
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if !pairs.is_empty() {
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        let safe: String = encoded
            .chars()
            .filter(|c| *c != '%')
            .map(|c| if c == '&' || c == '=' { '_' } else { c })
            .collect();
        path.push_str("_q_");
        path.push_str(&safe);
    }

    let last_segment = path.rsplit('/').next().unwrap_or("");
    if !last_segment.contains('.') {
        path.push_str(".html");
    }

    let mut file = crawl_dir.join(extract_authority(url).unwrap_or_default());
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            continue;
        }
        file.push(segment);
    }
    file
}

/// Reconstructs the source URL of a saved page
///
/// Inverse of [`file_path_for`] for pages without a query: strips the crawl
/// directory, the `.html` suffix and a trailing `index`, then prefixes the
/// scheme. Returns `None` when `file` is not under `crawl_dir`.
///
/// ```
/// use site_harvest::output::source_url_for;
/// use std::path::Path;
///
/// let crawl = Path::new("out/crawl");
/// assert_eq!(
///     source_url_for(crawl, Path::new("out/crawl/example.com/docs/api.html"), "https"),
///     Some("https://example.com/docs/api".to_string())
/// );
/// ```
pub fn source_url_for(crawl_dir: &Path, file: &Path, scheme: &str) -> Option<String> {
    let relative = file.strip_prefix(crawl_dir).ok()?;

    let mut joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return None;
    }

    if let Some(stripped) = joined.strip_suffix(".html") {
        joined = stripped.to_string();
    }
    if let Some(stripped) = joined.strip_suffix("/index") {
        joined = format!("{}/", stripped);
    }

    Some(format!("{}://{}", scheme, joined))
}
