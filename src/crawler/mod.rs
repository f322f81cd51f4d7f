//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with redirect following
//! - HTML extraction of links and forms
//! - The FIFO frontier and per-origin politeness scheduling
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use extractor::{extract, PageExtract, RawForm};
pub use fetcher::{
    build_http_client, fetch_url, FetchError, FetchErrorKind, FetchResponse, MAX_REDIRECTS,
};
pub use frontier::{Frontier, FrontierEntry};
pub use scheduler::{effective_delay, PolitenessScheduler};

use crate::config::Config;
use crate::storage::ResultStore;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration
/// 2. Build the HTTP client and robots gate
/// 3. Seed the frontier with the start URL
/// 4. Fetch pages and follow in-scope links
/// 5. Return every recorded page
///
/// Use [`Coordinator`] directly to cancel a running crawl.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(ResultStore)` - Crawl completed
/// * `Err(CrawlError)` - Crawl could not be started
pub async fn crawl(config: Config) -> Result<ResultStore, CrawlError> {
    run_crawl(config).await
}
