//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Validating the start URL and preparing the output directory
//! - Managing the frontier queue and the worker pool
//! - Robots, domain and resource-type filtering
//! - Locale negotiation for multilingual sites
//! - Fetching, decoding, persisting and link extraction
//! - Handling cancellation and producing the final summary

use crate::config::Config;
use crate::crawler::decode::decode_html;
use crate::crawler::fetcher::{build_http_client, fetch_page, probe_exists, FetchResult, ProbeOutcome};
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::{Frontier, PolitenessLimiter, QueuedUrl};
use crate::locale::{
    build_locale_url, extract_locale, normalize_locale, select_preferred_locale_url, LocaleConfig,
};
use crate::output::{file_path_for, format_progress, reset_crawl_dir, write_page, CrawlSummary};
use crate::robots::RobotsPolicy;
use crate::state::PageOutcome;
use crate::url::{
    extract_authority, extract_base_path, is_non_html_resource, normalize_start_url, origin_of,
};
use crate::{SiteError, UrlError};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Crawls one documentation site into a local file tree
///
/// A `Fetcher` is reusable: every call to [`Fetcher::fetch`] runs an
/// independent session with its own visited sets, robots cache and counters.
///
/// # Example
///
/// ```no_run
/// use site_harvest::{Config, Fetcher, LocaleConfig};
///
/// # async fn run() -> Result<(), site_harvest::SiteError> {
/// let fetcher = Fetcher::new(Config::default())
///     .with_output_dir("build/download")
///     .with_locale(Some(LocaleConfig::path_based(vec!["en".into(), "ja".into()])));
/// let summary = fetcher.fetch("docs.example.com/guide/").await?;
/// println!("saved {} pages", summary.pages_saved);
/// # Ok(())
/// # }
/// ```
pub struct Fetcher {
    config: Config,
    output_dir: PathBuf,
    locale: Option<LocaleConfig>,
    cancel: CancellationToken,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    ///
    /// The output directory comes from `[output] base-dir`; locale mode is
    /// enabled when `[locale] enabled = true`.
    pub fn new(config: Config) -> Self {
        let output_dir = PathBuf::from(&config.output.base_dir);
        let locale = config
            .locale
            .enabled
            .then(|| LocaleConfig::from(&config.locale));

        Self {
            config,
            output_dir,
            locale,
            cancel: CancellationToken::new(),
        }
    }

    /// Overrides the output base directory (pages go to `<dir>/crawl`)
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Enables (`Some`) or disables (`None`) locale-aware crawling
    pub fn with_locale(mut self, locale: Option<LocaleConfig>) -> Self {
        self.locale = locale;
        self
    }

    /// Overrides the maximum crawl depth
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.config.crawler.max_depth = max_depth;
        self
    }

    /// Sets the locale configuration in place
    pub fn set_locale_config(&mut self, locale: Option<LocaleConfig>) {
        self.locale = locale;
    }

    /// Returns the active locale configuration, if any
    pub fn locale_config(&self) -> Option<&LocaleConfig> {
        self.locale.as_ref()
    }

    /// Returns the effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the output base directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Token that cancels a running crawl when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls the site rooted at `target_url`
    ///
    /// # Process
    ///
    /// 1. Normalize and validate the start URL
    /// 2. Restrict the crawl to its authority and derive the robots base path
    /// 3. Reset `<output>/crawl`
    /// 4. Process (url, depth) items breadth-first with a bounded worker pool
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - The crawl ran to completion (or was cancelled)
    /// * `Err(SiteError)` - Setup failed; no pages were fetched
    pub async fn fetch(&self, target_url: &str) -> Result<CrawlSummary, SiteError> {
        crate::config::validate(&self.config)?;

        let start_url = normalize_start_url(target_url)?;
        let domain = extract_authority(&start_url).ok_or(UrlError::MissingDomain)?;

        let user_agent = self.config.user_agent.header_value();
        let page_client = build_http_client(
            &self.config.user_agent,
            Duration::from_secs(self.config.crawler.page_timeout_secs),
        )?;
        let probe_client = build_http_client(
            &self.config.user_agent,
            Duration::from_secs(self.config.crawler.probe_timeout_secs),
        )?;

        let mut robots = RobotsPolicy::new(probe_client.clone(), user_agent);
        if let Some(base_path) = extract_base_path(&start_url) {
            tracing::info!("Using base path for robots.txt: {}", base_path);
            robots.set_base_path(&base_path);
        }

        let crawl_dir = reset_crawl_dir(&self.output_dir).await?;

        tracing::info!(
            "Crawling {} (max depth {}, {} workers{})",
            start_url,
            self.config.crawler.max_depth,
            self.config.crawler.workers,
            match &self.locale {
                Some(cfg) => format!(", locales {:?}", cfg.effective_priority()),
                None => String::new(),
            }
        );

        let session = Arc::new(CrawlSession {
            domain,
            max_depth: self.config.crawler.max_depth,
            crawl_dir,
            page_client,
            probe_client,
            locale: self.locale.clone(),
            robots,
            limiter: PolitenessLimiter::new(Duration::from_millis(
                self.config.crawler.politeness_delay_ms,
            )),
            cancel: self.cancel.clone(),
            visited: Mutex::new(VisitedSets::default()),
            download_count: AtomicU64::new(0),
            start_time: Instant::now(),
            fetched_at: Utc::now(),
        });

        let outcome_counts =
            run_workers(&session, start_url.to_string(), self.config.crawler.workers).await;

        let summary = session.summary(outcome_counts);
        if summary.cancelled {
            tracing::warn!(
                "Crawl cancelled: {} pages saved in {:?}",
                summary.pages_saved,
                summary.elapsed
            );
        } else {
            tracing::info!(
                "Crawl complete: {} pages saved in {:?} ({:.1}/s)",
                summary.pages_saved,
                summary.elapsed,
                summary.pages_per_second()
            );
        }

        Ok(summary)
    }
}

/// Drives the frontier through a bounded pool of tasks
///
/// Finished tasks are collected before new ones are started, so children are
/// queued as soon as their parent completes. Cancellation stops dispatching;
/// in-flight tasks are still awaited and counted.
async fn run_workers(
    session: &Arc<CrawlSession>,
    start_url: String,
    workers: u32,
) -> BTreeMap<PageOutcome, u64> {
    let mut frontier = Frontier::with_start(start_url);
    let semaphore = Arc::new(Semaphore::new(workers.max(1) as usize));
    let mut tasks: JoinSet<(QueuedUrl, PageOutcome, Vec<String>)> = JoinSet::new();
    let mut counts = BTreeMap::new();

    let mut record = |joined: Result<(QueuedUrl, PageOutcome, Vec<String>), tokio::task::JoinError>,
                      frontier: &mut Frontier| match joined {
        Ok((item, outcome, links)) => {
            *counts.entry(outcome).or_insert(0) += 1;
            frontier.extend_children(links, item.depth);
        }
        Err(e) => tracing::error!("Crawl task failed: {}", e),
    };

    loop {
        if session.cancel.is_cancelled() {
            break;
        }

        if frontier.is_empty() {
            match tasks.join_next().await {
                Some(joined) => {
                    record(joined, &mut frontier);
                    continue;
                }
                None => break,
            }
        }

        tokio::select! {
            biased;
            _ = session.cancel.cancelled() => break,
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                record(joined, &mut frontier);
            }
            permit = semaphore.clone().acquire_owned() => {
                let Ok(permit) = permit else { break };
                let Some(item) = frontier.pop() else { continue };
                let session = Arc::clone(session);
                tasks.spawn(async move {
                    let _permit = permit;
                    let (outcome, links) = session.process(&item).await;
                    (item, outcome, links)
                });
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        record(joined, &mut frontier);
    }
    if !frontier.is_empty() {
        tracing::info!("{} queued URLs were not processed", frontier.len());
    }

    counts
}

#[derive(Debug, Default)]
struct VisitedSets {
    /// Exact URL strings (standard mode)
    urls: HashSet<String>,

    /// Canonical paths (locale mode)
    canonical: HashSet<String>,
}

/// State shared by all workers of one crawl
struct CrawlSession {
    domain: String,
    max_depth: u32,
    crawl_dir: PathBuf,
    page_client: Client,
    probe_client: Client,
    locale: Option<LocaleConfig>,
    robots: RobotsPolicy,
    limiter: PolitenessLimiter,
    cancel: CancellationToken,
    visited: Mutex<VisitedSets>,
    download_count: AtomicU64,
    start_time: Instant,
    fetched_at: DateTime<Utc>,
}

impl CrawlSession {
    fn pages_saved(&self) -> u64 {
        self.download_count.load(Ordering::Relaxed)
    }

    fn summary(&self, outcome_counts: BTreeMap<PageOutcome, u64>) -> CrawlSummary {
        CrawlSummary {
            domain: self.domain.clone(),
            crawl_dir: self.crawl_dir.clone(),
            pages_saved: self.pages_saved(),
            outcome_counts,
            elapsed: self.start_time.elapsed(),
            fetched_at: self.fetched_at,
            cancelled: self.cancel.is_cancelled(),
        }
    }

    /// Marks an exact URL visited; false if it already was
    fn mark_visited(&self, url: &str) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(|e| e.into_inner());
        visited.urls.insert(url.to_string())
    }

    /// Marks a canonical path visited; false if it already was
    fn mark_canonical(&self, canonical: &str) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(|e| e.into_inner());
        visited.canonical.insert(canonical.to_string())
    }

    /// Processes a single queued URL
    ///
    /// This method:
    /// 1. Enforces the depth bound
    /// 2. Filters invalid, foreign and non-HTML URLs
    /// 3. Checks robots.txt
    /// 4. Deduplicates (by URL, or by canonical path in locale mode)
    /// 5. Fetches, saves and extracts links
    ///
    /// # Returns
    ///
    /// The outcome and the links to enqueue at `depth + 1`
    async fn process(&self, item: &QueuedUrl) -> (PageOutcome, Vec<String>) {
        if item.depth > self.max_depth {
            return (PageOutcome::DepthExceeded, Vec::new());
        }
        if self.cancel.is_cancelled() {
            return (PageOutcome::Cancelled, Vec::new());
        }

        let url = match Url::parse(&item.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping invalid URL {}: {}", item.url, e);
                return (PageOutcome::InvalidUrl, Vec::new());
            }
        };

        if extract_authority(&url).as_deref() != Some(self.domain.as_str()) {
            return (PageOutcome::OffDomain, Vec::new());
        }
        if is_non_html_resource(&item.url) {
            return (PageOutcome::NonHtmlResource, Vec::new());
        }

        match self.robots_allows(&url).await {
            Some(true) => {}
            Some(false) => {
                tracing::info!("Blocked by robots.txt: {}", url);
                return (PageOutcome::RobotsDenied, Vec::new());
            }
            None => return (PageOutcome::Cancelled, Vec::new()),
        }

        match &self.locale {
            Some(cfg) => {
                let (_, canonical) = extract_locale(&url, Some(cfg));
                if !self.mark_canonical(&canonical) {
                    return (PageOutcome::AlreadyVisited, Vec::new());
                }
                self.fetch_with_locale(&url, &canonical, cfg).await
            }
            None => {
                if !self.mark_visited(&item.url) {
                    return (PageOutcome::AlreadyVisited, Vec::new());
                }
                self.fetch_and_save(&url, None).await
            }
        }
    }

    /// Robots verdict, or `None` if cancelled while fetching robots.txt
    async fn robots_allows(&self, url: &Url) -> Option<bool> {
        tokio::select! {
            allowed = self.robots.is_allowed(url) => Some(allowed),
            _ = self.cancel.cancelled() => None,
        }
    }

    /// Probe outcome, or `None` if cancelled
    async fn probe(&self, url: &str) -> Option<ProbeOutcome> {
        tokio::select! {
            outcome = probe_exists(&self.probe_client, url) => Some(outcome),
            _ = self.cancel.cancelled() => None,
        }
    }

    /// Fetches the best available language version of a canonical path
    ///
    /// Candidates are probed in priority order; the first that exists is
    /// fetched. A 403/429/5xx probe abandons the canonical path. When no
    /// preferred locale exists the literal URL is probed as a last resort.
    async fn fetch_with_locale(
        &self,
        url: &Url,
        canonical: &str,
        cfg: &LocaleConfig,
    ) -> (PageOutcome, Vec<String>) {
        let Some(base) = origin_of(url) else {
            return (PageOutcome::InvalidUrl, Vec::new());
        };

        let mut chosen: Option<(Url, String)> = None;
        for locale in cfg.effective_priority() {
            let candidate = build_locale_url(&base, &locale, canonical, Some(cfg));
            let Ok(candidate_url) = Url::parse(&candidate) else {
                continue;
            };

            if candidate_url != *url {
                match self.robots_allows(&candidate_url).await {
                    Some(true) => {}
                    Some(false) => {
                        tracing::debug!("Locale candidate blocked by robots.txt: {}", candidate);
                        continue;
                    }
                    None => return (PageOutcome::Cancelled, Vec::new()),
                }
            }

            match self.probe(&candidate).await {
                None => return (PageOutcome::Cancelled, Vec::new()),
                Some(ProbeOutcome::Exists) => {
                    chosen = Some((candidate_url, locale));
                    break;
                }
                Some(ProbeOutcome::Abort(status)) => {
                    tracing::warn!(
                        "{} returned status {}, skipping canonical {}",
                        candidate,
                        status,
                        canonical
                    );
                    return (PageOutcome::LocaleAborted, Vec::new());
                }
                Some(ProbeOutcome::Missing(status)) => {
                    tracing::debug!("{} not available (status {})", candidate, status);
                }
                Some(ProbeOutcome::Unreachable) => {
                    tracing::debug!("{} unreachable", candidate);
                }
            }
        }

        let (fetch_url, found_locale) = match chosen {
            Some(found) => found,
            None => match self.probe(url.as_str()).await {
                None => return (PageOutcome::Cancelled, Vec::new()),
                Some(ProbeOutcome::Exists) => (url.clone(), String::new()),
                Some(other) => {
                    tracing::debug!(
                        "No locale version of {} found ({:?}), skipping",
                        canonical,
                        other
                    );
                    return (PageOutcome::LocaleNotFound, Vec::new());
                }
            },
        };

        self.fetch_and_save(&fetch_url, Some((cfg, found_locale.as_str())))
            .await
    }

    /// Fetches one page, writes it to disk and returns its links
    ///
    /// `locale` carries the locale configuration and the locale that was
    /// selected (empty for the literal-URL fallback) in locale mode.
    async fn fetch_and_save(
        &self,
        url: &Url,
        locale: Option<(&LocaleConfig, &str)>,
    ) -> (PageOutcome, Vec<String>) {
        let origin = origin_of(url).unwrap_or_default();
        if !self.limiter.wait(&origin, &self.cancel).await {
            return (PageOutcome::Cancelled, Vec::new());
        }

        let result = tokio::select! {
            result = fetch_page(&self.page_client, url) => result,
            _ = self.cancel.cancelled() => return (PageOutcome::Cancelled, Vec::new()),
        };

        let (final_url, content_type, body) = match result {
            FetchResult::Success {
                final_url,
                content_type,
                body,
            } => (final_url, content_type, body),
            FetchResult::ContentMismatch { content_type } => {
                tracing::debug!("Skipping {}: Content-Type {}", url, content_type);
                return (PageOutcome::ContentMismatch, Vec::new());
            }
            FetchResult::HttpError { status_code } => {
                tracing::warn!("{} returned status {}", url, status_code);
                let outcome = if status_code == 404 {
                    PageOutcome::DeadLink
                } else {
                    PageOutcome::HttpError
                };
                return (outcome, Vec::new());
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Failed to fetch {}: {}", url, error);
                return (PageOutcome::Unreachable, Vec::new());
            }
        };

        let html = decode_html(&body, &content_type);
        let file = file_path_for(&self.crawl_dir, url);
        if let Err(e) = write_page(&file, &html).await {
            tracing::warn!("Failed to write file {}: {}", file.display(), e);
            return (PageOutcome::WriteFailed, Vec::new());
        }

        let count = self.download_count.fetch_add(1, Ordering::Relaxed) + 1;
        let progress = format_progress(count, self.start_time.elapsed(), url.as_str());
        match locale {
            Some((_, found)) if !found.is_empty() => tracing::info!("[{}] {}", found, progress),
            _ => tracing::info!("{}", progress),
        }

        let parsed = parse_html(&html, &final_url);

        if let Some((cfg, found)) = locale {
            let priority = cfg.effective_priority();
            if let Some((preferred, href)) = select_preferred_locale_url(&parsed.hreflang, &priority)
            {
                if normalize_locale(&preferred) != normalize_locale(found) {
                    tracing::debug!(
                        "{} declares preferred alternate {} ({}) but {} was fetched",
                        url,
                        href,
                        preferred,
                        if found.is_empty() { "the literal URL" } else { found }
                    );
                }
            }
        }

        (PageOutcome::Saved, parsed.links)
    }
}
