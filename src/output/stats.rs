//! Statistics generation from crawl results
//!
//! This module provides functionality for summarizing a finished crawl's
//! result store and displaying the summary.

use crate::state::PageState;
use crate::storage::ResultStore;
use crate::url::origin_key;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use url::Url;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of pages recorded
    pub total_pages: u64,

    /// Count of pages by state
    pub pages_by_state: BTreeMap<PageState, u64>,

    /// Fetched pages whose status was not 2xx
    pub http_errors: u64,

    /// Number of distinct origins among recorded URLs
    pub unique_origins: u64,

    /// Total number of in-scope links found
    pub total_links: u64,

    /// Total number of forms found
    pub total_forms: u64,

    /// Deepest depth recorded
    pub max_depth: u32,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlStatistics {
    /// Computes statistics over every record in `results`
    ///
    /// # Arguments
    ///
    /// * `results` - The result store of a finished crawl
    /// * `started_at` - When the crawl began
    /// * `finished_at` - When the crawl returned
    pub fn from_results(
        results: &ResultStore,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut pages_by_state = BTreeMap::new();
        let mut origins = HashSet::new();
        let mut http_errors = 0;
        let mut total_links = 0;
        let mut total_forms = 0;
        let mut max_depth = 0;

        for record in results.iter() {
            let state = record.state();
            *pages_by_state.entry(state).or_insert(0) += 1;

            if state == PageState::Fetched && record.error.is_some() {
                http_errors += 1;
            }
            if let Ok(url) = Url::parse(&record.url) {
                origins.insert(origin_key(&url));
            }

            total_links += record.out_links.len() as u64;
            total_forms += record.forms.len() as u64;
            max_depth = max_depth.max(record.depth);
        }

        Self {
            total_pages: results.len() as u64,
            pages_by_state,
            http_errors,
            unique_origins: origins.len() as u64,
            total_links,
            total_forms,
            max_depth,
            started_at,
            finished_at,
        }
    }

    /// Number of pages recorded in `state`
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Formats statistics as a human-readable report
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Crawl Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Started: {}", stats.started_at.to_rfc3339());
    let _ = writeln!(out, "  Finished: {}", stats.finished_at.to_rfc3339());
    let _ = writeln!(
        out,
        "  Duration: {:.1}s",
        stats.duration().num_milliseconds() as f64 / 1000.0
    );
    let _ = writeln!(out, "  Pages recorded: {}", stats.total_pages);
    let _ = writeln!(out, "  Unique origins: {}", stats.unique_origins);
    let _ = writeln!(out, "  Links found: {}", stats.total_links);
    let _ = writeln!(out, "  Forms found: {}", stats.total_forms);
    let _ = writeln!(out, "  Deepest page: depth {}", stats.max_depth);
    let _ = writeln!(out);

    let _ = writeln!(out, "Pages by State:");
    for state in PageState::ALL {
        let count = stats.count(state);
        if count == 0 {
            continue;
        }
        let percentage = if stats.total_pages > 0 {
            (count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        let _ = writeln!(out, "  {}: {} ({:.1}%)", state, count, percentage);
    }
    if stats.http_errors > 0 {
        let _ = writeln!(out, "  (of which non-2xx responses: {})", stats.http_errors);
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    print!("{}", format_statistics(stats));
}
