//! URL handling module
//!
//! This module provides link normalization, origin extraction, and the
//! scope filter that keeps a crawl on its start origin.

mod normalize;
mod origin;

use ::url::Url;

// Re-export main functions
pub use normalize::{normalize_link, parse_start_url};
pub use origin::{origin_key, same_origin};

/// Crawl scope derived from the start URL
///
/// A URL is in scope when it shares the start URL's origin, or always when
/// external crawling is allowed.
#[derive(Debug, Clone)]
pub struct Scope {
    start: Url,
    allow_external: bool,
}

impl Scope {
    /// Creates the scope for a crawl starting at `start`
    pub fn new(start: &Url, allow_external: bool) -> Self {
        Self {
            start: start.clone(),
            allow_external,
        }
    }

    /// Returns true if the URL may be recorded as an out-link and crawled
    pub fn contains(&self, url: &Url) -> bool {
        self.allow_external || same_origin(url, &self.start)
    }

    /// Normalizes a raw link and applies the scope check
    ///
    /// # Returns
    ///
    /// * `Some(Url)` - Absolute, fragment-free, in-scope URL
    /// * `None` - The link was rejected (not an error)
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use webscan_crawler::url::Scope;
    ///
    /// let start = Url::parse("http://x.test/").unwrap();
    /// let scope = Scope::new(&start, false);
    ///
    /// assert!(scope.resolve(&start, "/a").is_some());
    /// assert!(scope.resolve(&start, "https://other.test/").is_none());
    /// ```
    pub fn resolve(&self, base: &Url, raw: &str) -> Option<Url> {
        let url = normalize_link(base, raw)?;
        if self.contains(&url) {
            Some(url)
        } else {
            tracing::trace!("Out of scope: {}", url);
            None
        }
    }
}
