//! Output module for persisting crawl results and reporting on them
//!
//! This module handles:
//! - Writing the result store as pretty-printed JSON
//! - Deriving the default results file name from the start URL
//! - Computing and printing crawl statistics

pub mod stats;

pub use stats::{format_statistics, print_statistics, CrawlStatistics};

use crate::storage::ResultStore;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes the result store to `path` as pretty-printed JSON
///
/// Missing parent directories are created. The JSON object maps each URL to
/// its page record, in discovery order.
///
/// # Arguments
///
/// * `results` - The result store to persist
/// * `path` - Destination file; overwritten if it exists
pub fn write_json_results(results: &ResultStore, path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!("Wrote {} records to {}", results.len(), path.display());
    Ok(())
}

/// Persists the results of a finished crawl
///
/// A failure here is the one error a crawl can raise after it has run.
pub fn save_results(results: &ResultStore, path: &Path) -> crate::Result<()> {
    write_json_results(results, path)?;
    tracing::info!("Saved {} page records to {}", results.len(), path.display());
    Ok(())
}

/// Returns `<output_dir>/scan_results_<safe>.json` for a crawl of `start_url`
pub fn default_results_path(output_dir: impl AsRef<Path>, start_url: &Url) -> PathBuf {
    output_dir
        .as_ref()
        .join(format!("scan_results_{}.json", make_safe_filename(start_url)))
}

/// Turns a URL into a string usable as part of a file name
///
/// Host (with any explicit port) and path are joined, surrounding slashes
/// trimmed, and `/` and `:` replaced with `_`. Falls back to the host alone,
/// then to `root`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webscan_crawler::output::make_safe_filename;
///
/// let url = Url::parse("http://localhost:3000/app/login").unwrap();
/// assert_eq!(make_safe_filename(&url), "localhost_3000_app_login");
/// ```
pub fn make_safe_filename(url: &Url) -> String {
    let netloc = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let safe = format!("{}{}", netloc, url.path())
        .trim_matches('/')
        .replace(['/', ':'], "_");

    if !safe.is_empty() {
        safe
    } else if !netloc.is_empty() {
        netloc
    } else {
        "root".to_string()
    }
}
