//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for page content:
//! - Building HTTP clients with the crawler's User-Agent
//! - GET requests for page bodies, with Content-Type screening
//! - Existence probes (HEAD, falling back to a one-byte ranged GET)
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Content-Type header value (empty when absent)
        content_type: String,
        /// Raw page body
        body: Vec<u8>,
    },

    /// A Content-Type was sent and it is not HTML
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// The server answered with something other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, body read failure)
    NetworkError {
        /// Error description
        error: String,
    },
}

/// Result of an existence probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The URL exists (200, or 206 for a ranged GET)
    Exists,

    /// Not there; the next candidate may be tried
    Missing(u16),

    /// The server refused or failed (403, 429, 5xx); stop probing this page
    Abort(u16),

    /// No HTTP answer at all
    Unreachable,
}

impl ProbeOutcome {
    fn from_status(status: StatusCode, ranged: bool) -> Self {
        let code = status.as_u16();
        if status == StatusCode::OK || (ranged && status == StatusCode::PARTIAL_CONTENT) {
            ProbeOutcome::Exists
        } else if status == StatusCode::FORBIDDEN
            || status == StatusCode::TOO_MANY_REQUESTS
            || status.is_server_error()
        {
            ProbeOutcome::Abort(code)
        } else {
            ProbeOutcome::Missing(code)
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Whole-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_harvest::config::UserAgentConfig;
/// use site_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "site-harvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = config.header_value();

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body
///
/// Redirects are followed by the client. Only a 200 counts as success. A
/// missing Content-Type header is accepted; a present one must mention
/// `text/html`.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: describe_error(&e),
            }
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let final_url = response.url().clone();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.is_empty() && !content_type.contains("text/html") {
        return FetchResult::ContentMismatch { content_type };
    }

    match response.bytes().await {
        Ok(body) => FetchResult::Success {
            final_url,
            content_type,
            body: body.to_vec(),
        },
        Err(e) => FetchResult::NetworkError {
            error: format!("failed to read body: {}", describe_error(&e)),
        },
    }
}

/// Checks whether a URL exists without downloading it
///
/// Sends a HEAD request. When HEAD fails at the transport level, or the
/// server rejects the method (405/501), retries as `GET` with
/// `Range: bytes=0-0`, where 206 also counts as existing.
///
/// # Arguments
///
/// * `client` - The HTTP client to use (carries the short probe timeout)
/// * `url` - The candidate URL
pub async fn probe_exists(client: &Client, url: &str) -> ProbeOutcome {
    match client.head(url).send().await {
        Ok(response) => {
            let status = response.status();
            if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
                tracing::debug!("HEAD rejected by {} ({}), retrying with range", url, status);
                probe_with_range(client, url).await
            } else {
                ProbeOutcome::from_status(status, false)
            }
        }
        Err(e) => {
            tracing::debug!("HEAD {} failed: {}, retrying with range", url, e);
            probe_with_range(client, url).await
        }
    }
}

async fn probe_with_range(client: &Client, url: &str) -> ProbeOutcome {
    match client.get(url).header(header::RANGE, "bytes=0-0").send().await {
        Ok(response) => ProbeOutcome::from_status(response.status(), true),
        Err(e) => {
            tracing::debug!("Ranged GET {} failed: {}", url, e);
            ProbeOutcome::Unreachable
        }
    }
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
