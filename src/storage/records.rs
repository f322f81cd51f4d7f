use crate::state::PageState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reason recorded for pages robots.txt forbids
pub const BLOCKED_BY_ROBOTS: &str = "blocked_by_robots";

/// A form input, textarea or select found inside a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    /// The `name` attribute, if present
    pub name: Option<String>,

    /// The `type` attribute, or the element's tag name when absent
    #[serde(rename = "type")]
    pub input_type: String,
}

/// A form found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// The raw `action` attribute (empty when absent)
    pub action: String,

    /// Lowercased `method` attribute, `"get"` when absent
    pub method: String,

    /// Inputs in document order
    pub inputs: Vec<FormInput>,

    /// `action` resolved against the page URL; the page itself for an empty action
    pub resolved_action: String,
}

/// The once-written result of crawling a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,

    /// HTTP status of the final response; 0 when no response was received
    pub status: u16,

    pub headers: IndexMap<String, String>,
    pub depth: u32,
    pub forms: Vec<FormDescriptor>,

    /// Normalized, in-scope links in document order
    pub out_links: Vec<String>,

    pub error: Option<String>,
    pub skipped_reason: Option<String>,
}

impl PageRecord {
    fn empty(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            status: 0,
            headers: IndexMap::new(),
            depth,
            forms: Vec::new(),
            out_links: Vec::new(),
            error: None,
            skipped_reason: None,
        }
    }

    /// Record for a page robots.txt forbids; no request was made
    pub fn blocked_by_robots(url: impl Into<String>, depth: u32) -> Self {
        Self {
            skipped_reason: Some(BLOCKED_BY_ROBOTS.to_string()),
            ..Self::empty(url, depth)
        }
    }

    /// Record for a request that failed before a response arrived
    pub fn fetch_failed(url: impl Into<String>, depth: u32, cause: impl Into<String>) -> Self {
        Self {
            error: Some(cause.into()),
            ..Self::empty(url, depth)
        }
    }

    /// Record for a received response; links and forms are filled in afterwards
    pub fn fetched(
        url: impl Into<String>,
        depth: u32,
        status: u16,
        headers: IndexMap<String, String>,
    ) -> Self {
        Self {
            status,
            headers,
            ..Self::empty(url, depth)
        }
    }

    /// Derives the terminal state this record represents
    pub fn state(&self) -> PageState {
        if self.skipped_reason.is_some() {
            PageState::SkippedRobots
        } else if self.status == 0 {
            PageState::FetchError
        } else {
            PageState::Fetched
        }
    }
}
