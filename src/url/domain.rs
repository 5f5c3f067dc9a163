use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_harvest::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the authority (`host[:port]`) of a URL
///
/// The port is only present when it differs from the scheme default, so
/// `https://example.com:443/` and `https://example.com/` share an authority.
/// Domain restriction and the on-disk directory name both use this value.
///
/// ```
/// use url::Url;
/// use site_harvest::url::extract_authority;
///
/// let url = Url::parse("http://127.0.0.1:8080/docs").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = extract_domain(url)?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Returns `scheme://authority` for a URL, the key for per-origin state
pub fn origin_of(url: &Url) -> Option<String> {
    extract_authority(url).map(|authority| format!("{}://{}", url.scheme(), authority))
}
