//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// The rule source behind a parsed policy
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rules {
    /// No policy applies; every URL is permitted
    AllowAll,
    /// Access to the policy itself was refused; no URL is permitted
    DisallowAll,
    /// robots.txt body, matched on demand
    Content(String),
}

/// Parsed robots.txt data
///
/// This is a wrapper around the robotstxt crate's matcher, providing a simplified
/// interface for checking if URLs are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRobots {
    rules: Rules,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            rules: Rules::Content(content.to_string()),
        }
    }

    /// Creates a permissive ParsedRobots that allows everything
    ///
    /// This is used when robots.txt is missing or cannot be fetched.
    pub fn allow_all() -> Self {
        Self {
            rules: Rules::AllowAll,
        }
    }

    /// Creates a ParsedRobots that denies everything
    ///
    /// Used when the server answers the robots.txt request with 401 or 403.
    pub fn disallow_all() -> Self {
        Self {
            rules: Rules::DisallowAll,
        }
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL or path to check (e.g., "/page.html")
    /// * `user_agent` - Full user agent string; only its product token is matched
    ///
    /// # Returns
    ///
    /// * `true` - If the URL is allowed
    /// * `false` - If the URL is disallowed
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        match &self.rules {
            Rules::AllowAll => true,
            Rules::DisallowAll => false,
            Rules::Content(content) if content.trim().is_empty() => true,
            Rules::Content(content) => {
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(content, product_token(user_agent), url)
            }
        }
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A group naming the agent's product token takes precedence over the
    /// `*` group.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let content = match &self.rules {
            Rules::Content(content) => content,
            Rules::AllowAll | Rules::DisallowAll => return None,
        };

        let token = product_token(user_agent).to_lowercase();
        let mut group_agents: Vec<String> = Vec::new();
        let mut reading_agents = false;
        let mut delay_for_wildcard: Option<f64> = None;
        let mut delay_for_agent: Option<f64> = None;

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if key == "user-agent" {
                // Consecutive User-agent lines form one group
                if !reading_agents {
                    group_agents.clear();
                    reading_agents = true;
                }
                group_agents.push(product_token(value).to_lowercase());
                continue;
            }
            reading_agents = false;

            if key != "crawl-delay" {
                continue;
            }
            let Ok(delay) = value.parse::<f64>() else {
                continue;
            };
            if !delay.is_finite() || delay < 0.0 {
                continue;
            }

            if !token.is_empty() && group_agents.iter().any(|ua| *ua == token) {
                delay_for_agent = Some(delay);
            } else if group_agents.iter().any(|ua| ua == "*") {
                delay_for_wildcard = Some(delay);
            }
        }

        delay_for_agent.or(delay_for_wildcard)
    }
}

/// Extracts the product token robots.txt groups are matched against
///
/// `WebScanProCrawler/1.0 (+https://example.com)` yields `WebScanProCrawler`.
/// A lone `*` is kept as is.
pub fn product_token(user_agent: &str) -> &str {
    let trimmed = user_agent.trim();
    if trimmed == "*" {
        return trimmed;
    }
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '-' || c == '_'))
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}
