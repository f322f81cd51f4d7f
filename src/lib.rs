//! WebScan crawler: a polite, scope-bounded page graph crawler
//!
//! This crate discovers the reachable pages and forms of a target web
//! application, respecting robots.txt, per-origin politeness delays, and
//! depth/page limits. Its output is a mapping from URL to page record that
//! downstream analyzers consume.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Errors that stop a crawl from starting or its results from being saved
///
/// Per-URL failures never surface here; they are recorded on the page
/// record instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid start URL: {0}")]
    StartUrl(#[from] UrlError),

    #[error("Could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Could not write results: {0}")]
    Results(#[from] output::OutputError),
}

/// Errors loading or validating the crawl configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidUrl(String),
}

/// Reasons a string is not usable as a crawl start URL
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("not an absolute URL ({0})")]
    Parse(String),

    #[error("{0}")]
    InvalidScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Result type alias for crawl setup
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration loading and validation
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub type UrlResult<T> = std::result::Result<T, UrlError>;

pub use config::Config;
pub use crawler::{crawl, Coordinator};
pub use state::PageState;
pub use storage::{FormDescriptor, FormInput, PageRecord, ResultStore};
pub use crate::url::{normalize_link, parse_start_url, Scope};
