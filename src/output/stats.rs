//! Crawl statistics and progress reporting
//!
//! This module provides the summary returned by a crawl and the helpers
//! that format progress lines and the final report.

use crate::state::PageOutcome;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Result of one completed (or cancelled) crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// Authority the crawl was restricted to
    pub domain: String,

    /// Directory the pages were written under (`<output>/crawl`)
    pub crawl_dir: PathBuf,

    /// Number of pages written to disk
    pub pages_saved: u64,

    /// How many items ended in each outcome
    pub outcome_counts: BTreeMap<PageOutcome, u64>,

    /// Wall-clock time of the crawl
    pub elapsed: Duration,

    /// Timestamp captured once when the crawl started
    pub fetched_at: DateTime<Utc>,

    /// Whether the crawl stopped early on cancellation
    pub cancelled: bool,
}

impl CrawlSummary {
    /// Returns the count for one outcome
    pub fn count(&self, outcome: PageOutcome) -> u64 {
        self.outcome_counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Total number of processed items across all outcomes
    pub fn total_items(&self) -> u64 {
        self.outcome_counts.values().sum()
    }

    /// Number of items that ended in a recoverable error
    pub fn error_count(&self) -> u64 {
        self.outcome_counts
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Saved pages per second of wall-clock time
    pub fn pages_per_second(&self) -> f64 {
        rate(self.pages_saved, self.elapsed)
    }

    /// The crawl timestamp in RFC 3339 form, for downstream frontmatter
    pub fn fetched_at_rfc3339(&self) -> String {
        self.fetched_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn rate(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

/// Formats a progress line: `[N pages | MmSSs | R/s] url`
///
/// Long URLs are shortened to their last 60 characters.
pub fn format_progress(count: u64, elapsed: Duration, url: &str) -> String {
    let total_secs = elapsed.as_secs();
    let short_url = match url.char_indices().rev().nth(59) {
        Some((idx, _)) if url.chars().count() > 60 => &url[idx..],
        _ => url,
    };

    format!(
        "[{} pages | {}m{:02}s | {:.1}/s] {}",
        count,
        total_secs / 60,
        total_secs % 60,
        rate(count, elapsed),
        short_url
    )
}

/// Prints a crawl summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Domain: {}", summary.domain);
    println!("  Output: {}", summary.crawl_dir.display());
    println!("  Fetched at: {}", summary.fetched_at_rfc3339());
    println!(
        "  Elapsed: {}m{:02}s",
        summary.elapsed.as_secs() / 60,
        summary.elapsed.as_secs() % 60
    );
    println!(
        "  Pages saved: {} ({:.1}/s)",
        summary.pages_saved,
        summary.pages_per_second()
    );
    if summary.cancelled {
        println!("  Crawl was cancelled before completion");
    }
    println!();

    println!("Items by Outcome:");
    let mut counts: Vec<_> = summary
        .outcome_counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(a.1));

    let total = summary.total_items();
    for (outcome, count) in counts {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
    println!();

    let errors = summary.error_count();
    if errors > 0 {
        println!("{} item(s) ended in an error; see warnings above", errors);
    }
}
