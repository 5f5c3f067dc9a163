//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and existence probes
//! - Charset detection and decoding
//! - HTML parsing and link extraction
//! - Frontier and politeness scheduling
//! - Overall crawl coordination

mod coordinator;
mod decode;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::Fetcher;
pub use decode::decode_html;
pub use fetcher::{build_http_client, fetch_page, probe_exists, FetchResult, ProbeOutcome};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use scheduler::{Frontier, PolitenessLimiter, QueuedUrl};
