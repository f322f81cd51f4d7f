//! Per-origin politeness scheduling
//!
//! This module handles:
//! - Reserving fixed-interval fetch slots per origin
//! - Waiting for a reserved slot without holding any lock
//! - Integrating robots.txt crawl delays

use crate::state::OriginState;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Spaces fetches to the same origin by at least the politeness delay
///
/// Slots are reserved synchronously and awaited afterwards, so any number of
/// workers can share one scheduler. Different origins never wait on each
/// other.
#[derive(Debug, Default)]
pub struct PolitenessScheduler {
    origins: Mutex<HashMap<String, OriginState>>,
}

impl PolitenessScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the next slot for `origin` and returns when it opens
    ///
    /// The first fetch to an origin proceeds immediately. Dropping the
    /// returned future after the reservation still consumes the slot.
    ///
    /// # Returns
    ///
    /// How long the caller had to wait
    pub async fn wait_turn(&self, origin: &str, delay: Duration) -> Duration {
        let now = Instant::now();
        let slot = self.reserve(origin, delay, now);
        let wait = slot.saturating_duration_since(now);

        if !wait.is_zero() {
            tracing::debug!("Waiting {:?} for politeness slot on {}", wait, origin);
            tokio::time::sleep_until(tokio::time::Instant::from_std(slot)).await;
        }
        wait
    }

    fn reserve(&self, origin: &str, delay: Duration, now: Instant) -> Instant {
        let mut origins = self.origins.lock().unwrap_or_else(PoisonError::into_inner);
        let state = origins.entry(origin.to_string()).or_default();
        let slot = state.reserve(delay, now);
        tracing::trace!("Reserved request #{} to {}", state.request_count, origin);
        slot
    }

    /// Number of origins that have had at least one slot reserved
    pub fn origin_count(&self) -> usize {
        self.origins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Calculates the effective delay for an origin
///
/// This takes the maximum of:
/// - The configured politeness delay
/// - The robots.txt crawl delay, when honoring it is enabled
///
/// # Arguments
///
/// * `configured` - The configured delay between requests
/// * `robots_delay` - The `Crawl-delay` published for our agent, if any
/// * `honor_crawl_delay` - Whether robots.txt may raise the delay
pub fn effective_delay(
    configured: Duration,
    robots_delay: Option<Duration>,
    honor_crawl_delay: bool,
) -> Duration {
    match robots_delay {
        Some(robots) if honor_crawl_delay => std::cmp::max(configured, robots),
        _ => configured,
    }
}
