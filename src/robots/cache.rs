//! Robots.txt policy engine with a per-session cache
//!
//! Rules are fetched once per `scheme://authority` (plus base path, when one
//! is configured) and kept for the lifetime of the engine. A cached `None`
//! records that no robots.txt exists, which allows everything.

use crate::robots::{fetch_robots, RobotsRuleSet};
use crate::url::origin_of;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Answers "may this crawler fetch this URL?"
pub struct RobotsPolicy {
    client: Client,
    user_agent: String,
    base_path: String,
    cache: Mutex<HashMap<String, Option<Arc<RobotsRuleSet>>>>,
}

impl RobotsPolicy {
    /// Creates a policy engine
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for robots.txt (should carry the short probe timeout)
    /// * `user_agent` - Our full User-Agent string; its product token selects robots groups
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            base_path: String::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the base path used for subdirectory robots.txt lookups
    ///
    /// The path is normalized to start with `/` and not end with `/`; an empty
    /// string (or `/`) disables the fallback. When set and the root robots.txt
    /// is missing, `<basePath>/robots.txt` is tried next.
    pub fn set_base_path(&mut self, base_path: &str) {
        let trimmed = base_path.trim_end_matches('/');
        self.base_path = if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
    }

    /// Returns the normalized base path (empty when disabled)
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Checks whether a URL may be crawled
    ///
    /// URLs without a host are allowed; so is everything on an origin that
    /// has no robots.txt. Rules are matched against the percent-decoded path,
    /// so `Disallow: /docs/日本語/` covers `/docs/%E6%97%A5%E6%9C%AC%E8%AA%9E/`.
    pub async fn is_allowed(&self, url: &Url) -> bool {
        match self.rules_for(url).await {
            Some(rules) => {
                let path = percent_decode_str(url.path()).decode_utf8_lossy();
                rules.is_path_allowed(&path)
            }
            None => true,
        }
    }

    /// Returns the cached rules for the URL's origin, fetching them on first use
    ///
    /// The cache lock is held across the fetch so concurrent callers for the
    /// same origin wait for one download instead of racing.
    pub async fn rules_for(&self, url: &Url) -> Option<Arc<RobotsRuleSet>> {
        let origin = origin_of(url)?;
        let cache_key = format!("{}{}", origin, self.base_path);

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&cache_key) {
            return cached.clone();
        }

        let root_url = format!("{}/robots.txt", origin);
        let mut rules = fetch_robots(&self.client, &root_url, &self.user_agent).await;

        if rules.is_none() && !self.base_path.is_empty() {
            let scoped_url = format!("{}{}/robots.txt", origin, self.base_path);
            tracing::info!(
                "Root robots.txt not found, trying subdirectory: {}",
                scoped_url
            );
            rules = fetch_robots(&self.client, &scoped_url, &self.user_agent).await;
        }

        if let Some(delay) = rules.as_ref().and_then(|r| r.crawl_delay) {
            tracing::debug!(
                "robots.txt for {} requests Crawl-delay {:?} (not enforced)",
                cache_key,
                delay
            );
        }

        let rules = rules.map(Arc::new);
        cache.insert(cache_key, rules.clone());
        rules
    }

    #[cfg(test)]
    async fn cached_origins(&self) -> usize {
        self.cache.lock().await.len()
    }
}
