use scraper::{Html, Selector};
use std::collections::HashMap;

/// Collects `<link rel="alternate" hreflang="X" href="Y">` pairs
///
/// Keys are lower-cased hreflang values; a later duplicate overwrites an
/// earlier one. Hrefs are returned as written (not resolved).
pub fn extract_hreflang(document: &Html) -> HashMap<String, String> {
    let mut alternates = HashMap::new();

    let Ok(selector) = Selector::parse("link[hreflang][href]") else {
        return alternates;
    };

    for element in document.select(&selector) {
        let value = element.value();

        let is_alternate = value
            .attr("rel")
            .map(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("alternate"))
            })
            .unwrap_or(false);
        if !is_alternate {
            continue;
        }

        let (Some(hreflang), Some(href)) = (value.attr("hreflang"), value.attr("href")) else {
            continue;
        };
        if hreflang.is_empty() || href.is_empty() {
            continue;
        }

        alternates.insert(hreflang.to_lowercase(), href.to_string());
    }

    alternates
}

/// Picks the alternate matching the highest-priority locale
///
/// Each priority entry is tried as-is and as `{loc}-{loc}`. When nothing in
/// the priority list is present, the entry with the smallest key is returned
/// so the fallback is stable between runs. `None` only for an empty map.
pub fn select_preferred_locale_url(
    alternates: &HashMap<String, String>,
    priority: &[String],
) -> Option<(String, String)> {
    if alternates.is_empty() {
        return None;
    }

    for locale in priority {
        if let Some(url) = alternates.get(locale) {
            return Some((locale.clone(), url.clone()));
        }

        let doubled = format!("{}-{}", locale, locale);
        if let Some(url) = alternates.get(&doubled) {
            return Some((doubled, url.clone()));
        }
    }

    alternates
        .iter()
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(locale, url)| (locale.clone(), url.clone()))
}
