use crate::locale::LocaleConfig;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Locale codes recognised as a leading path segment
static KNOWN_LOCALES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "en", "en-us", "en-gb", "ja", "ja-jp", "zh", "zh-cn", "zh-tw", "zh-hk", "ko", "ko-kr",
        "de", "de-de", "fr", "fr-fr", "es", "es-es", "it", "it-it", "pt", "pt-br", "ru", "ru-ru",
        "ar", "nl", "pl", "tr", "vi", "th", "id", "ms",
    ]
    .into_iter()
    .collect()
});

/// First path segment shaped like a locale: `xx` or `xx-YY`..`xx-YYYY`
static LOCALE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([a-z]{2}(?:-[a-zA-Z]{2,4})?)/").expect("valid locale regex"));

/// Returns true if `code` (case-insensitive) is a known path locale
pub fn is_known_locale(code: &str) -> bool {
    KNOWN_LOCALES.contains(code.to_lowercase().as_str())
}

/// Extracts `(locale, canonical_path)` from a URL
///
/// Query mode reads the configured parameter (empty locale when absent) and
/// returns the path unchanged. Path mode strips a known leading locale
/// segment; anything else leaves the locale empty and the path intact.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_harvest::locale::{extract_locale, LocaleConfig};
///
/// let url = Url::parse("https://example.com/ja/docs/api").unwrap();
/// assert_eq!(extract_locale(&url, None), ("ja".to_string(), "/docs/api".to_string()));
///
/// let cfg = LocaleConfig::query_based(vec![], "hl");
/// let url = Url::parse("https://ai.google.dev/docs?hl=ja").unwrap();
/// assert_eq!(extract_locale(&url, Some(&cfg)), ("ja".to_string(), "/docs".to_string()));
/// ```
pub fn extract_locale(url: &Url, cfg: Option<&LocaleConfig>) -> (String, String) {
    let path = url.path();

    if let Some(param) = cfg.and_then(LocaleConfig::query_param) {
        let locale = url
            .query_pairs()
            .find(|(key, _)| key == param)
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        return (locale, path.to_string());
    }

    if let Some(caps) = LOCALE_SEGMENT.captures(path) {
        let segment = &caps[1];
        let candidate = segment.to_lowercase();
        if KNOWN_LOCALES.contains(candidate.as_str()) {
            let rest = &path[segment.len() + 1..];
            let canonical = if rest.is_empty() { "/" } else { rest };
            return (candidate, canonical.to_string());
        }
    }

    (String::new(), path.to_string())
}

/// Builds the URL of `canonical` in `locale`
///
/// `base` is `scheme://authority` without a trailing slash. An empty locale
/// yields `base + canonical`. Query mode sets (or overwrites) the configured
/// parameter; path mode inserts `/{locale}` in front of the canonical path.
///
/// ```
/// use site_harvest::locale::{build_locale_url, LocaleConfig};
///
/// assert_eq!(
///     build_locale_url("https://example.com", "ja", "/docs/api", None),
///     "https://example.com/ja/docs/api"
/// );
/// let cfg = LocaleConfig::query_based(vec![], "hl");
/// assert_eq!(
///     build_locale_url("https://ai.google.dev", "en", "/docs", Some(&cfg)),
///     "https://ai.google.dev/docs?hl=en"
/// );
/// ```
pub fn build_locale_url(
    base: &str,
    locale: &str,
    canonical: &str,
    cfg: Option<&LocaleConfig>,
) -> String {
    let plain = format!("{}{}", base, canonical);
    if locale.is_empty() {
        return plain;
    }

    if let Some(param) = cfg.and_then(LocaleConfig::query_param) {
        let Ok(mut url) = Url::parse(&plain) else {
            return plain;
        };

        let mut pairs: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != param)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        pairs.push((param.to_string(), locale.to_string()));
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        url.query_pairs_mut().clear().extend_pairs(pairs);
        return url.to_string();
    }

    format!("{}/{}{}", base, locale, canonical)
}
