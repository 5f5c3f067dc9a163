//! Scheduler for managing the crawl frontier and politeness spacing
//!
//! This module handles:
//! - The FIFO frontier of (url, depth) items
//! - Per-origin spacing of page requests

use crate::state::OriginState;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// A URL queued for processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// The URL as extracted (absolute, fragment removed)
    pub url: String,

    /// Link distance from the start URL
    pub depth: u32,
}

impl QueuedUrl {
    /// Creates a queued item
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// First-in first-out work queue of pending items
///
/// Items come out in the order they were pushed, so the crawl proceeds
/// breadth-first and depth never decreases along the queue.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<QueuedUrl>,
}

impl Frontier {
    /// Creates a frontier seeded with the start item at depth 0
    pub fn with_start(url: impl Into<String>) -> Self {
        let mut frontier = Self::default();
        frontier.push(QueuedUrl::new(url, 0));
        frontier
    }

    /// Adds an item to the back of the queue
    pub fn push(&mut self, item: QueuedUrl) {
        self.queue.push_back(item);
    }

    /// Adds every link as a child of an item at `parent_depth`
    pub fn extend_children(&mut self, links: Vec<String>, parent_depth: u32) {
        let depth = parent_depth.saturating_add(1);
        self.queue
            .extend(links.into_iter().map(|url| QueuedUrl::new(url, depth)));
    }

    /// Takes the oldest item
    pub fn pop(&mut self) -> Option<QueuedUrl> {
        self.queue.pop_front()
    }

    /// Returns the number of items waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Spaces page requests to the same origin by a fixed delay
///
/// Each caller reserves the next free slot for its origin under the lock
/// and sleeps outside it, so concurrent workers queue up behind each other
/// instead of all firing once the delay expires.
pub struct PolitenessLimiter {
    delay: Duration,
    origins: Mutex<HashMap<String, OriginState>>,
}

impl PolitenessLimiter {
    /// Creates a limiter with the given per-origin delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            origins: Mutex::new(HashMap::new()),
        }
    }

    /// Reserves a slot for `origin` and returns how long to wait for it
    pub fn reserve(&self, origin: &str) -> Duration {
        let mut origins = self.origins.lock().unwrap_or_else(|e| e.into_inner());
        origins
            .entry(origin.to_string())
            .or_insert_with(OriginState::new)
            .reserve(Instant::now(), self.delay)
    }

    /// Waits for this origin's next slot
    ///
    /// # Returns
    ///
    /// * `true` - The slot arrived
    /// * `false` - The crawl was cancelled while waiting
    pub async fn wait(&self, origin: &str, cancel: &CancellationToken) -> bool {
        let wait = self.reserve(origin);
        if wait.is_zero() {
            return !cancel.is_cancelled();
        }

        tracing::trace!("Politeness wait {:?} for {}", wait, origin);
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(wait) => true,
        }
    }

    #[cfg(test)]
    fn request_count(&self, origin: &str) -> u32 {
        let origins = self.origins.lock().unwrap_or_else(|e| e.into_inner());
        origins.get(origin).map_or(0, |state| state.request_count)
    }
}
