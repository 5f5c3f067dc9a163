use std::time::{Duration, Instant};

/// Tracks the request timing of one origin during crawling
///
/// Used by the politeness limiter to space page requests to the same
/// `scheme://authority`.
#[derive(Debug, Clone, Default)]
pub struct OriginState {
    /// Number of page requests reserved for this origin
    pub request_count: u32,

    /// Earliest instant at which the next request may start
    pub next_slot: Option<Instant>,
}

impl OriginState {
    /// Creates a new OriginState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next request slot and returns how long to wait for it
    ///
    /// The slot is `max(now, next_slot)`; the following slot is pushed to
    /// `slot + delay`. The first request to an origin is never delayed.
    ///
    /// # Arguments
    ///
    /// * `now` - The current time instant
    /// * `delay` - Minimum spacing between requests to this origin
    pub fn reserve(&mut self, now: Instant, delay: Duration) -> Duration {
        let slot = match self.next_slot {
            Some(next) if next > now => next,
            _ => now,
        };

        self.request_count += 1;
        self.next_slot = Some(slot + delay);
        slot.saturating_duration_since(now)
    }
}
