//! Storage module for crawl results
//!
//! This module holds the page records produced by a crawl:
//! - Page, form and input record types
//! - The write-once, capacity-bounded result store

mod records;
mod results;

pub use records::{FormDescriptor, FormInput, PageRecord, BLOCKED_BY_ROBOTS};
pub use results::ResultStore;

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("A record for {0} already exists")]
    DuplicateUrl(String),

    #[error("Result store is full ({capacity} records); rejected {url}")]
    CapacityExceeded { capacity: usize, url: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
