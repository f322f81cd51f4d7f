use std::time::{Duration, Instant};

/// Tracks the politeness state of one origin during crawling
///
/// Fetch slots are handed out at fixed intervals: each reservation starts no
/// earlier than the previous one plus the delay.
#[derive(Debug, Clone, Default)]
pub struct OriginState {
    /// Number of fetch slots reserved for this origin in the current crawl
    pub request_count: u32,

    /// Start of the most recently reserved slot
    pub last_slot: Option<Instant>,
}

impl OriginState {
    /// Creates a new OriginState with no history
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next fetch slot and returns the instant it opens
    pub fn reserve(&mut self, delay: Duration, now: Instant) -> Instant {
        let slot = match self.last_slot {
            Some(last) => std::cmp::max(now, last + delay),
            None => now,
        };
        self.last_slot = Some(slot);
        self.request_count += 1;
        slot
    }
}
