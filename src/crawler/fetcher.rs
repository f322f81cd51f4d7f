//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests following redirects
//! - Flattening response headers
//! - Error classification

use indexmap::IndexMap;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::error::Error as _;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Redirect hops followed before a fetch fails
pub const MAX_REDIRECTS: usize = 10;

/// Upper bound for establishing a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A received HTTP response
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers keyed by lowercase name; repeated names are joined with ", "
    pub headers: IndexMap<String, String>,
    /// Page body content
    pub body: String,
}

impl FetchResponse {
    /// Returns the Content-Type header value, if any
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE.as_str()).map(String::as_str)
    }

    /// Whether the body should be parsed as HTML
    ///
    /// A response without a Content-Type is treated as HTML.
    pub fn is_html(&self) -> bool {
        match self.content_type() {
            Some(content_type) => {
                let content_type = content_type.to_ascii_lowercase();
                content_type.contains("text/html") || content_type.contains("application/xhtml+xml")
            }
            None => true,
        }
    }
}

/// Classification of a transport-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The request exceeded its timeout
    Timeout,
    /// DNS, connection refused, TLS handshake and similar
    Connect,
    /// Redirect loop or too many redirects
    Redirect,
    /// The response body could not be read
    Body,
    /// Any other request failure
    Request,
}

/// A fetch that produced no usable response
#[derive(Debug, Clone, Error)]
#[error("{cause}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// Human-readable description, including the underlying causes
    pub cause: String,
}

impl FetchError {
    fn from_reqwest(e: &reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            FetchErrorKind::Timeout
        } else if e.is_connect() {
            FetchErrorKind::Connect
        } else if e.is_redirect() {
            FetchErrorKind::Redirect
        } else if e.is_body() || e.is_decode() {
            FetchErrorKind::Body
        } else {
            FetchErrorKind::Request
        };

        let prefix = match kind {
            FetchErrorKind::Timeout => "request timed out",
            FetchErrorKind::Connect => "connection failed",
            FetchErrorKind::Redirect => "redirect error",
            FetchErrorKind::Body => "failed to read body",
            FetchErrorKind::Request => "request failed",
        };

        Self {
            kind,
            cause: format!("{}: {}", prefix, error_chain(e)),
        }
    }
}

/// Renders an error with its sources, e.g. "error sending request: tcp connect error: Connection refused"
fn error_chain(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The `User-Agent` header value
/// * `timeout` - Total timeout applied to every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use webscan_crawler::crawler::build_http_client;
///
/// let client = build_http_client("WebScanProCrawler/1.0", Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(std::cmp::min(timeout, CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a single GET request
///
/// Redirects are followed automatically (up to [`MAX_REDIRECTS`]); the final
/// response is returned whatever its status code. Transport failures are
/// returned as a [`FetchError`] value. No retry is attempted.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_url(client: &Client, url: &Url) -> Result<FetchResponse, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let headers = flatten_headers(response.headers());

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(&e))?;

    Ok(FetchResponse {
        final_url,
        status,
        headers,
        body,
    })
}

/// Flattens a header map into name → value, in response order
fn flatten_headers(map: &HeaderMap) -> IndexMap<String, String> {
    let mut headers: IndexMap<String, String> = IndexMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}
