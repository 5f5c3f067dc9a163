//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! It respects robots.txt directives when crawling websites.

mod cache;
mod parser;

pub use cache::RobotsPolicy;
pub use parser::{path_matches, product_token, AgentMatch, RobotsRuleSet};

use reqwest::{Client, StatusCode};

/// Fetches and parses one robots.txt file
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `robots_url` - Full URL of the robots.txt file
/// * `user_agent` - Our User-Agent string, used to select the applicable group
///
/// # Returns
///
/// * `Some(RobotsRuleSet)` - The file exists (HTTP 200) and was parsed
/// * `None` - Any other status, or the request failed; callers treat this as "allow all"
pub async fn fetch_robots(client: &Client, robots_url: &str, user_agent: &str) -> Option<RobotsRuleSet> {
    let response = match client
        .get(robots_url)
        .header(reqwest::header::USER_AGENT, user_agent)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("Failed to fetch {}: {}", robots_url, e);
            return None;
        }
    };

    if response.status() != StatusCode::OK {
        tracing::debug!("{} returned status {}", robots_url, response.status());
        return None;
    }

    match response.text().await {
        Ok(body) => {
            tracing::info!("Successfully fetched robots.txt from {}", robots_url);
            Some(RobotsRuleSet::parse(&body, user_agent))
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", robots_url, e);
            None
        }
    }
}
