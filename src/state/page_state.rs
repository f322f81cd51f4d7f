//! Terminal states of a recorded page
//!
//! Every record in the result store is in exactly one of these states.

use serde::Serialize;
use std::fmt;

/// How a page's crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageState {
    /// robots.txt forbids fetching the page; recorded without a request
    SkippedRobots,

    /// The request failed at the transport level
    FetchError,

    /// A response was received (any status code)
    Fetched,
}

impl PageState {
    /// All states, in report order
    pub const ALL: [PageState; 3] = [Self::SkippedRobots, Self::FetchError, Self::Fetched];

    /// Stable lowercase name, used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkippedRobots => "skipped_robots",
            Self::FetchError => "fetch_error",
            Self::Fetched => "fetched",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
