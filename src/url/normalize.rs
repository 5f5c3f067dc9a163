use crate::UrlError;
use url::Url;

/// Normalizes and validates the crawl start URL
///
/// # Rules
///
/// 1. Prepend `https://` when the string carries no explicit `scheme://` prefix
/// 2. Parse the URL; reject if malformed
/// 3. Reject schemes other than http and https
/// 4. Reject URLs without a host
///
/// # Examples
///
/// ```
/// use site_harvest::url::normalize_start_url;
///
/// let url = normalize_start_url("docs.example.com/guide/").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide/");
/// ```
pub fn normalize_start_url(input: &str) -> Result<Url, UrlError> {
    let input = input.trim();
    let explicit_scheme = input
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        });

    let candidate = if explicit_scheme.is_some() {
        input.to_string()
    } else {
        let prefixed = format!("https://{}", input);
        tracing::info!("No scheme provided, using: {}", prefixed);
        prefixed
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Extracts the base path (first path segment) of a URL
///
/// Used to locate a project-scoped robots.txt on subdirectory-hosted sites
/// such as GitHub Pages project pages.
///
/// ```
/// use url::Url;
/// use site_harvest::url::extract_base_path;
///
/// let url = Url::parse("https://user.github.io/project/docs/").unwrap();
/// assert_eq!(extract_base_path(&url), Some("/project".to_string()));
/// ```
pub fn extract_base_path(url: &Url) -> Option<String> {
    url.path()
        .trim_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!("/{}", segment))
}
