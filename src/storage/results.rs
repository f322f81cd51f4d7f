//! In-memory result store
//!
//! Records are kept in insertion (discovery) order so that serialized output
//! is reproducible run to run.

use crate::storage::{PageRecord, StorageError, StorageResult};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Mapping from URL to its page record, bounded by the crawl's page limit
#[derive(Debug, Clone)]
pub struct ResultStore {
    records: IndexMap<String, PageRecord>,
    capacity: usize,
}

impl ResultStore {
    /// Creates an empty store holding at most `capacity` records
    pub fn new(capacity: usize) -> Self {
        Self {
            records: IndexMap::new(),
            capacity,
        }
    }

    /// Inserts a finished record keyed by its URL
    ///
    /// Records are write-once: a second record for the same URL, or any record
    /// beyond the capacity, is rejected and the store is left unchanged.
    pub fn insert(&mut self, record: PageRecord) -> StorageResult<()> {
        if self.records.contains_key(&record.url) {
            return Err(StorageError::DuplicateUrl(record.url));
        }
        if self.is_full() {
            return Err(StorageError::CapacityExceeded {
                capacity: self.capacity,
                url: record.url,
            });
        }
        self.records.insert(record.url.clone(), record);
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.records.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.records.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True once the page limit is reached
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Records in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &PageRecord> {
        self.records.values()
    }

    /// URL keys in discovery order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

impl Serialize for ResultStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
