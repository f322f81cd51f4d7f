//! Per-origin robots.txt gate
//!
//! The gate fetches each origin's policy at most once per crawl. Callers for
//! the same origin share one in-progress fetch; callers for different origins
//! never wait on each other.

use crate::robots::{fetch_robots, ParsedRobots, RobotsFetch};
use crate::url::origin_key;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

type PolicyCell = Arc<OnceCell<ParsedRobots>>;

/// Answers whether a URL may be fetched under the configured user agent
pub struct RobotsGate {
    client: Client,
    user_agent: String,
    timeout: Duration,
    policies: Mutex<HashMap<String, PolicyCell>>,
}

impl RobotsGate {
    /// Creates a gate using `client` for robots.txt requests
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client (already carrying the user agent header)
    /// * `user_agent` - Agent identity matched against robots.txt groups
    /// * `timeout` - Bound for each robots.txt request
    pub fn new(client: Client, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            timeout,
            policies: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether `url` may be fetched
    ///
    /// The first query for an origin fetches its robots.txt; the answer is
    /// memoized for the rest of the run.
    pub async fn can_fetch(&self, url: &Url) -> bool {
        let cell = self.cell_for(url);
        let policy = cell.get_or_init(|| self.load(url)).await;
        policy.is_allowed(url.as_str(), &self.user_agent)
    }

    /// Returns the Crawl-delay the origin of `url` requests from this agent
    pub async fn crawl_delay(&self, url: &Url) -> Option<Duration> {
        let cell = self.cell_for(url);
        let policy = cell.get_or_init(|| self.load(url)).await;
        policy
            .crawl_delay(&self.user_agent)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    fn cell_for(&self, url: &Url) -> PolicyCell {
        let mut policies = self.policies.lock().unwrap_or_else(PoisonError::into_inner);
        policies.entry(origin_key(url)).or_default().clone()
    }

    async fn load(&self, url: &Url) -> ParsedRobots {
        let origin = origin_key(url);
        match fetch_robots(&self.client, url, self.timeout).await {
            RobotsFetch::Policy(policy) => {
                tracing::debug!("Loaded robots.txt policy for {}", origin);
                policy
            }
            RobotsFetch::Unavailable(reason) => {
                tracing::info!(
                    "robots.txt unavailable for {} ({}); permitting all URLs on this origin",
                    origin,
                    reason
                );
                ParsedRobots::allow_all()
            }
        }
    }
}
