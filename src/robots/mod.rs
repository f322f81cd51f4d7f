//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Policies are cached per origin for the lifetime of one crawl; an origin whose policy
//! cannot be retrieved is treated as permitting everything (fail-open).

mod gate;
mod parser;

pub use gate::RobotsGate;
pub use parser::{product_token, ParsedRobots};

use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Outcome of a robots.txt retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotsFetch {
    /// The server answered with a usable policy
    Policy(ParsedRobots),

    /// No policy could be obtained; the reason is kept for logging
    Unavailable(String),
}

/// Returns the robots.txt location for the origin of `url`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webscan_crawler::robots::robots_url;
///
/// let url = Url::parse("http://127.0.0.1:8080/a/b?c").unwrap();
/// assert_eq!(robots_url(&url).unwrap().as_str(), "http://127.0.0.1:8080/robots.txt");
/// ```
pub fn robots_url(url: &Url) -> Option<Url> {
    url.join("/robots.txt").ok()
}

/// Fetches robots.txt for the origin of `url`
///
/// # Status Handling
///
/// | Response | Policy |
/// |----------|--------|
/// | 2xx | Parsed body |
/// | 401, 403 | Disallow all |
/// | Other 4xx | Allow all |
/// | 5xx, network error, timeout | Unavailable |
///
/// # Arguments
///
/// * `client` - HTTP client carrying the crawler's user agent
/// * `url` - Any URL on the origin whose policy is wanted
/// * `timeout` - Upper bound for the whole request
pub async fn fetch_robots(client: &Client, url: &Url, timeout: Duration) -> RobotsFetch {
    let Some(location) = robots_url(url) else {
        return RobotsFetch::Unavailable(format!("no robots.txt location for {}", url));
    };

    tracing::debug!("Fetching {}", location);

    let response = match client.get(location.clone()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return RobotsFetch::Unavailable(e.to_string()),
    };

    let status = response.status();
    if status.is_success() {
        return match response.text().await {
            Ok(body) => RobotsFetch::Policy(ParsedRobots::from_content(&body)),
            Err(e) => RobotsFetch::Unavailable(format!("failed to read {}: {}", location, e)),
        };
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return RobotsFetch::Policy(ParsedRobots::disallow_all());
    }

    if status.is_client_error() {
        return RobotsFetch::Policy(ParsedRobots::allow_all());
    }

    RobotsFetch::Unavailable(format!("HTTP {} for {}", status.as_u16(), location))
}
