//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Claiming frontier entries under the page and depth limits
//! - Gating each URL through robots.txt and the politeness scheduler
//! - Fetching, extracting and recording pages
//! - Enqueueing newly discovered in-scope links
//! - Stopping promptly on cancellation

use crate::config::Config;
use crate::crawler::extractor::{extract, RawForm};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::scheduler::{effective_delay, PolitenessScheduler};
use crate::crawler::{build_http_client, fetch_url};
use crate::robots::RobotsGate;
use crate::storage::{FormDescriptor, FormInput, PageRecord, ResultStore};
use crate::url::{normalize_link, origin_key, parse_start_url, Scope};
use crate::CrawlError;
use reqwest::Client;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Shared crawl progress; only ever locked between awaits
#[derive(Debug)]
struct CrawlState {
    frontier: Frontier,
    results: ResultStore,
    /// Entries claimed by a worker and not yet recorded
    in_flight: usize,
}

/// Outcome of asking for the next unit of work
enum Claim {
    Entry(FrontierEntry),
    Wait,
    Done,
}

/// A visited page and the in-scope links it points to
struct Visit {
    record: PageRecord,
    links: Vec<Url>,
}

/// Main crawler coordinator structure
///
/// One coordinator runs one crawl. Workers share it by reference; the
/// frontier, visited set, in-flight counter and results sit behind a single
/// mutex that is never held across an await.
pub struct Coordinator {
    config: Config,
    start: Url,
    scope: Scope,
    client: Client,
    robots: RobotsGate,
    scheduler: PolitenessScheduler,
    state: Mutex<CrawlState>,
    progress: Notify,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration (validated here)
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or HTTP client failure
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        crate::config::validate(&config)?;

        let start = parse_start_url(&config.crawler.start_url)?;
        let scope = Scope::new(&start, config.crawler.allow_external);
        let user_agent = config.user_agent.header_value();

        let client = build_http_client(&user_agent, config.crawler.fetch_timeout_duration())?;
        let robots = RobotsGate::new(
            client.clone(),
            user_agent,
            config.crawler.robots_timeout_duration(),
        );

        let state = CrawlState {
            frontier: Frontier::seed(start.clone()),
            results: ResultStore::new(config.crawler.max_pages),
            in_flight: 0,
        };

        Ok(Self {
            config,
            start,
            scope,
            client,
            robots,
            scheduler: PolitenessScheduler::new(),
            state: Mutex::new(state),
            progress: Notify::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the coordinator's cancellation token
    ///
    /// Cancelling the token stops the crawl: pending robots lookups,
    /// politeness waits and fetches are abandoned without records.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Returns a handle that stops this crawl when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The normalized start URL
    pub fn start_url(&self) -> &Url {
        &self.start
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Spawns no tasks: `concurrency` workers are polled together on the
    /// current task. Always returns the result store, partially filled when
    /// the crawl was cancelled.
    pub async fn run(self) -> ResultStore {
        let workers = self.config.crawler.concurrency.max(1);
        let started = Instant::now();

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}, {} worker(s))",
            self.start,
            self.config.crawler.max_depth,
            self.config.crawler.max_pages,
            workers
        );

        futures::future::join_all((0..workers).map(|id| self.worker(id))).await;

        if self.cancel.is_cancelled() {
            tracing::warn!("Crawl cancelled; returning partial results");
        }

        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        tracing::info!(
            "Crawl finished: {} pages recorded, {} URLs discovered, {} origins contacted in {:?}",
            state.results.len(),
            state.frontier.visited_count(),
            self.scheduler.origin_count(),
            started.elapsed()
        );

        state.results
    }

    async fn worker(&self, id: usize) {
        tracing::trace!("Worker {} started", id);

        loop {
            // Registered before checking state so a completion in between is not missed
            let notified = self.progress.notified();

            match self.claim() {
                Claim::Entry(entry) => {
                    let visit = tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => None,
                        visit = self.visit(&entry) => Some(visit),
                    };
                    self.complete(&entry, visit);
                }
                Claim::Wait => {
                    tokio::select! {
                        _ = self.cancel.cancelled() => {}
                        _ = notified => {}
                    }
                }
                Claim::Done => break,
            }
        }

        tracing::trace!("Worker {} finished", id);
    }

    fn lock_state(&self) -> MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the next frontier entry if the page limit leaves room for it
    fn claim(&self) -> Claim {
        if self.cancel.is_cancelled() {
            return Claim::Done;
        }

        let max_pages = self.config.crawler.max_pages;
        let max_depth = self.config.crawler.max_depth;
        let mut state = self.lock_state();

        loop {
            if state.results.len() + state.in_flight >= max_pages {
                return Claim::Done;
            }

            match state.frontier.pop() {
                Some(entry) if entry.depth > max_depth => {
                    tracing::trace!("Discarding {} beyond max depth", entry.url);
                }
                Some(entry) => {
                    state.in_flight += 1;
                    return Claim::Entry(entry);
                }
                None if state.in_flight == 0 => return Claim::Done,
                None => return Claim::Wait,
            }
        }
    }

    /// Robots check, politeness wait, fetch and extraction for one URL
    async fn visit(&self, entry: &FrontierEntry) -> Visit {
        let url = &entry.url;

        if !self.robots.can_fetch(url).await {
            tracing::info!("Skipping {} (disallowed by robots.txt)", url);
            return Visit {
                record: PageRecord::blocked_by_robots(url.as_str(), entry.depth),
                links: Vec::new(),
            };
        }

        let origin = origin_key(url);
        let robots_delay = if self.config.crawler.honor_crawl_delay {
            self.robots.crawl_delay(url).await
        } else {
            None
        };
        let delay = effective_delay(
            self.config.crawler.delay_duration(),
            robots_delay,
            self.config.crawler.honor_crawl_delay,
        );
        self.scheduler.wait_turn(&origin, delay).await;

        tracing::debug!("Fetching {}", url);
        let response = match fetch_url(&self.client, url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", url, e);
                return Visit {
                    record: PageRecord::fetch_failed(url.as_str(), entry.depth, e.cause),
                    links: Vec::new(),
                };
            }
        };

        if response.final_url != url.as_str() {
            tracing::debug!("{} redirected to {}", url, response.final_url);
        }

        let mut record =
            PageRecord::fetched(url.as_str(), entry.depth, response.status, response.headers.clone());
        let mut links = Vec::new();

        if !(200..300).contains(&response.status) {
            record.error = Some(format!("HTTP {}", response.status));
        }

        if response.status == 200 && response.is_html() {
            let page = extract(&response.body);

            for raw in &page.links {
                if let Some(link) = self.scope.resolve(url, raw) {
                    record.out_links.push(link.to_string());
                    links.push(link);
                }
            }

            record.forms = page
                .forms
                .into_iter()
                .map(|form| resolve_form(url, form))
                .collect();
        } else if response.status == 200 {
            tracing::debug!(
                "Not parsing {} ({})",
                url,
                response.content_type().unwrap_or("no content type")
            );
        }

        Visit { record, links }
    }

    /// Releases a claim, enqueues discovered links and records the page
    fn complete(&self, entry: &FrontierEntry, visit: Option<Visit>) {
        let max_pages = self.config.crawler.max_pages;
        let max_depth = self.config.crawler.max_depth;

        {
            let mut state = self.lock_state();
            state.in_flight = state.in_flight.saturating_sub(1);

            if let Some(Visit { record, links }) = visit {
                let next_depth = entry.depth + 1;
                if next_depth <= max_depth {
                    for link in links {
                        let projected =
                            state.results.len() + state.frontier.len() + state.in_flight;
                        if projected >= max_pages {
                            break;
                        }
                        if state.frontier.try_enqueue(link, next_depth) {
                            tracing::trace!("Enqueued link at depth {}", next_depth);
                        }
                    }
                }

                let status = record.status;
                let url = record.url.clone();
                match state.results.insert(record) {
                    Ok(()) => tracing::info!(
                        "[{}] {} (depth {}) status={}",
                        state.results.len(),
                        url,
                        entry.depth,
                        status
                    ),
                    Err(e) => tracing::error!("Dropping record: {}", e),
                }
            } else {
                tracing::debug!("Abandoned {} on cancellation", entry.url);
            }
        }

        self.progress.notify_waiters();
    }
}

/// Resolves a form's action against the page it was found on
///
/// An empty action targets the page itself; an action that does not resolve
/// to an http(s) URL is kept verbatim.
fn resolve_form(page: &Url, form: RawForm) -> FormDescriptor {
    let resolved_action = if form.action.is_empty() {
        page.to_string()
    } else {
        normalize_link(page, &form.action)
            .map(|url| url.to_string())
            .unwrap_or_else(|| form.action.clone())
    };

    FormDescriptor {
        action: form.action,
        method: form.method,
        inputs: form
            .inputs
            .into_iter()
            .map(|(name, input_type)| FormInput { name, input_type })
            .collect(),
        resolved_action,
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Returns
///
/// * `Ok(ResultStore)` - Every page recorded during the crawl
/// * `Err(CrawlError)` - The crawl could not be set up
pub async fn run_crawl(config: Config) -> Result<ResultStore, CrawlError> {
    Ok(Coordinator::new(config)?.run().await)
}
