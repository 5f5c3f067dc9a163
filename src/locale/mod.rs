//! Locale resolution for multilingual documentation sites
//!
//! Pure functions that detect the locale of a URL, rebuild locale-qualified
//! URLs, and pick a preferred language variant from hreflang alternates.
//!
//! Two URL conventions are supported:
//!
//! * **Path mode** (no parameter name configured): the locale is the first
//!   path segment, e.g. `/ja/docs/api`, and is only recognised when it is one
//!   of the known locale codes.
//! * **Query mode** (parameter name configured): the locale travels in a
//!   query parameter, e.g. `/docs?hl=ja`.
//!
//! In both modes the *canonical path* is the path with the locale removed; it
//! is the locale-independent identity of a page.

mod detect;
mod hreflang;

pub use detect::{build_locale_url, extract_locale, is_known_locale};
pub use hreflang::{extract_hreflang, select_preferred_locale_url};

use crate::config::LocaleSection;

/// Locale priority used when the configuration lists none
pub const DEFAULT_LOCALE_PRIORITY: &[&str] = &["en", "ja"];

/// Locale negotiation settings for a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleConfig {
    /// Preferred locales, most preferred first
    pub priority: Vec<String>,

    /// Query parameter carrying the locale; `None` selects path mode
    pub param_name: Option<String>,
}

impl LocaleConfig {
    /// Creates a path-mode configuration
    pub fn path_based(priority: Vec<String>) -> Self {
        Self {
            priority,
            param_name: None,
        }
    }

    /// Creates a query-mode configuration using `param_name`
    pub fn query_based(priority: Vec<String>, param_name: impl Into<String>) -> Self {
        Self {
            priority,
            param_name: Some(param_name.into()),
        }
    }

    /// The configured query parameter, if query mode is active
    pub fn query_param(&self) -> Option<&str> {
        self.param_name.as_deref().filter(|p| !p.is_empty())
    }

    /// The priority list, falling back to [`DEFAULT_LOCALE_PRIORITY`] when empty
    pub fn effective_priority(&self) -> Vec<String> {
        if self.priority.is_empty() {
            DEFAULT_LOCALE_PRIORITY.iter().map(|s| s.to_string()).collect()
        } else {
            self.priority.clone()
        }
    }
}

impl From<&LocaleSection> for LocaleConfig {
    fn from(section: &LocaleSection) -> Self {
        Self {
            priority: section.priority.clone(),
            param_name: section.param_name.clone(),
        }
    }
}

/// Normalizes a locale code: lower-case plus a few common aliases
///
/// ```
/// use site_harvest::locale::normalize_locale;
///
/// assert_eq!(normalize_locale("ja-JP"), "ja");
/// assert_eq!(normalize_locale("zh-Hant"), "zh-tw");
/// assert_eq!(normalize_locale("FR"), "fr");
/// ```
pub fn normalize_locale(code: &str) -> String {
    let lower = code.to_lowercase();
    match lower.as_str() {
        "ja-jp" => "ja".to_string(),
        "en-us" | "en-gb" => "en".to_string(),
        "zh-hans" | "zh-cn" => "zh-cn".to_string(),
        "zh-hant" | "zh-tw" => "zh-tw".to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_aliases() {
        assert_eq!(normalize_locale("ja-jp"), "ja");
        assert_eq!(normalize_locale("en-US"), "en");
        assert_eq!(normalize_locale("en-gb"), "en");
        assert_eq!(normalize_locale("zh-Hans"), "zh-cn");
        assert_eq!(normalize_locale("ZH-CN"), "zh-cn");
        assert_eq!(normalize_locale("zh-hant"), "zh-tw");
        assert_eq!(normalize_locale("pt-BR"), "pt-br");
    }

    #[test]
    fn test_normalize_idempotent() {
        for code in [
            "ja-JP", "en-US", "en-GB", "zh-Hans", "zh-CN", "zh-Hant", "zh-TW", "ko", "DE-de", "",
            "x-unknown",
        ] {
            let once = normalize_locale(code);
            assert_eq!(normalize_locale(&once), once, "not idempotent for {:?}", code);
        }
    }

    #[test]
    fn test_effective_priority_default() {
        let cfg = LocaleConfig::default();
        assert_eq!(cfg.effective_priority(), vec!["en", "ja"]);

        let cfg = LocaleConfig::path_based(vec!["de".to_string()]);
        assert_eq!(cfg.effective_priority(), vec!["de"]);
    }

    #[test]
    fn test_from_config_section() {
        let section = LocaleSection {
            enabled: true,
            priority: vec!["ja".to_string()],
            param_name: Some("hl".to_string()),
        };
        let cfg = LocaleConfig::from(&section);
        assert_eq!(cfg.priority, vec!["ja"]);
        assert_eq!(cfg.query_param(), Some("hl"));
    }

    #[test]
    fn test_query_param_blank_is_path_mode() {
        let cfg = LocaleConfig::query_based(vec![], "");
        assert_eq!(cfg.query_param(), None);
        let cfg = LocaleConfig::query_based(vec![], "hl");
        assert_eq!(cfg.query_param(), Some("hl"));
    }
}
