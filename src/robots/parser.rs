//! Robots.txt parser and pattern matcher
//!
//! Parses the subset of robots.txt that matters to this crawler (User-agent,
//! Allow, Disallow, Crawl-delay) and answers path queries with the
//! longest-match-wins policy.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// How a `User-agent` token in robots.txt relates to this crawler
///
/// This is the complete matching contract. Tokens are compared against the
/// crawler's product token (see [`product_token`]), never against the full
/// User-Agent header, and there is no substring matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMatch {
    /// `*`: rules apply to every crawler without a group of its own
    Wildcard,
    /// Byte-for-byte equal to our product token
    Exact,
    /// Equal to our product token ignoring ASCII case
    CaseInsensitive,
    /// Some other crawler
    NoMatch,
}

impl AgentMatch {
    /// Classifies a robots.txt agent token against our product token
    pub fn classify(token: &str, product: &str) -> Self {
        if token == "*" {
            Self::Wildcard
        } else if token == product {
            Self::Exact
        } else if token.eq_ignore_ascii_case(product) {
            Self::CaseInsensitive
        } else {
            Self::NoMatch
        }
    }

    /// Returns true if the group names this crawler specifically
    pub fn is_specific(&self) -> bool {
        matches!(self, Self::Exact | Self::CaseInsensitive)
    }
}

/// Returns the product token of a User-Agent string
///
/// `site-harvest/0.1.0 (+https://...)` yields `site-harvest`.
pub fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .next()
        .unwrap_or(user_agent)
}

/// Rules from one robots.txt that apply to this crawler
#[derive(Debug, Clone)]
pub struct RobotsRuleSet {
    /// Path patterns that may be crawled (override shorter disallows)
    pub allow_rules: Vec<String>,

    /// Path patterns that must not be crawled
    pub disallow_rules: Vec<String>,

    /// Requested delay between requests; parsed but not enforced
    pub crawl_delay: Option<Duration>,

    /// When the robots.txt was retrieved
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RuleGroup {
    allow: Vec<String>,
    disallow: Vec<String>,
    crawl_delay: Option<Duration>,
}

impl RuleGroup {
    fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.disallow.is_empty()
    }
}

impl RobotsRuleSet {
    /// Parses robots.txt content for the given User-Agent
    ///
    /// Consecutive `User-agent` lines form one group. Rules from groups that
    /// name us specifically are collected separately from `*` rules; if any
    /// specific rule exists, the wildcard rules are discarded entirely
    /// (specific groups replace, they do not merge). An empty `Disallow:` adds
    /// nothing.
    pub fn parse(content: &str, user_agent: &str) -> Self {
        let product = product_token(user_agent);

        let mut specific = RuleGroup::default();
        let mut wildcard = RuleGroup::default();

        // Classification of the group currently being read
        let mut group_agents: Vec<AgentMatch> = Vec::new();
        let mut in_agent_lines = false;

        for raw_line in content.lines() {
            let line = match raw_line.find('#') {
                Some(idx) => &raw_line[..idx],
                None => raw_line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                if !in_agent_lines {
                    group_agents.clear();
                }
                group_agents.push(AgentMatch::classify(value, product));
                in_agent_lines = true;
                continue;
            }
            in_agent_lines = false;

            let target = if group_agents.iter().any(AgentMatch::is_specific) {
                &mut specific
            } else if group_agents.contains(&AgentMatch::Wildcard) {
                &mut wildcard
            } else {
                continue;
            };

            match key.as_str() {
                "disallow" => {
                    if !value.is_empty() {
                        target.disallow.push(value.to_string());
                    }
                }
                "allow" => {
                    if !value.is_empty() {
                        target.allow.push(value.to_string());
                    }
                }
                "crawl-delay" => {
                    if let Ok(secs) = value.parse::<f64>() {
                        if secs.is_finite() && secs >= 0.0 {
                            target.crawl_delay = Some(Duration::from_secs_f64(secs));
                        }
                    }
                }
                _ => {}
            }
        }

        let chosen = if specific.is_empty() {
            // Keep a crawl-delay declared in a specific group even without rules
            RuleGroup {
                crawl_delay: specific.crawl_delay.or(wildcard.crawl_delay),
                ..wildcard
            }
        } else {
            specific
        };

        Self {
            allow_rules: chosen.allow,
            disallow_rules: chosen.disallow,
            crawl_delay: chosen.crawl_delay,
            fetched_at: Utc::now(),
        }
    }

    /// Checks a URL path against the rules
    ///
    /// Allowed by default. Allow rules are scanned first, then disallow
    /// rules; a matching rule changes the verdict only when it is strictly
    /// longer than the best match so far. On an equal-length tie the allow
    /// rule therefore stands.
    pub fn is_path_allowed(&self, path: &str) -> bool {
        let path = if path.is_empty() { "/" } else { path };

        let mut allowed = true;
        let mut matched_len = 0;

        for rule in &self.allow_rules {
            if path_matches(path, rule) && rule.len() > matched_len {
                allowed = true;
                matched_len = rule.len();
            }
        }

        for rule in &self.disallow_rules {
            if path_matches(path, rule) && rule.len() > matched_len {
                allowed = false;
                matched_len = rule.len();
            }
        }

        allowed
    }
}

/// Matches a URL path against a robots.txt pattern
///
/// * a trailing `$` anchors the match to the end of the path
/// * `*` matches any run of characters; the literal fragments between stars
///   must appear in order, the first one at offset 0 unless the pattern
///   starts with `*`
/// * otherwise the pattern is a plain prefix
///
/// # Examples
///
/// ```
/// use site_harvest::robots::path_matches;
///
/// assert!(path_matches("/docs/api", "/docs/"));
/// assert!(path_matches("/docs/test/page.html", "/docs/*/page.html"));
/// assert!(path_matches("/docs", "/docs$"));
/// assert!(!path_matches("/docs/api", "/docs$"));
/// ```
pub fn path_matches(path: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    let (pattern, must_match_end) = match pattern.strip_suffix('$') {
        Some(stripped) => (stripped, true),
        None => (pattern, false),
    };

    if pattern.contains('*') {
        return wildcard_match(path, pattern, must_match_end);
    }

    if must_match_end {
        path == pattern
    } else {
        path.starts_with(pattern)
    }
}

fn wildcard_match(path: &str, pattern: &str, must_match_end: bool) -> bool {
    let anchored_start = !pattern.starts_with('*');
    let mut pos = 0;

    for (i, part) in pattern.split('*').enumerate() {
        if part.is_empty() {
            continue;
        }

        let Some(idx) = path[pos..].find(part) else {
            return false;
        };

        if i == 0 && anchored_start && idx != 0 {
            return false;
        }

        pos += idx + part.len();
    }

    // A trailing star swallows the rest of the path
    if must_match_end && !pattern.ends_with('*') && pos != path.len() {
        return false;
    }

    true
}
