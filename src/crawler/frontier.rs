//! FIFO crawl frontier with a visited set

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    /// Link distance from the start URL
    pub depth: u32,
}

/// Queue of pending URLs in discovery order
///
/// A URL is marked visited when it is enqueued, so it can never be enqueued
/// twice in one crawl, whatever happens to it afterwards.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the start URL at depth 0
    pub fn seed(start: Url) -> Self {
        let mut frontier = Self::new();
        frontier.try_enqueue(start, 0);
        frontier
    }

    /// Marks `url` visited and queues it
    ///
    /// Returns false, leaving the frontier unchanged, when the URL was
    /// already visited.
    pub fn try_enqueue(&mut self, url: Url, depth: u32) -> bool {
        if !self.visited.insert(url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Removes the oldest entry
    pub fn pop(&mut self) -> Option<FrontierEntry> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs ever enqueued
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
