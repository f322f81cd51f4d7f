//! State module for tracking crawl progress
//!
//! This module provides state management for pages and origins during the crawl process.
//!
//! # Components
//!
//! - `PageState`: Tracks the state of individual pages (skipped, failed, fetched)
//! - `OriginState`: Tracks per-origin fetch slots for politeness scheduling

mod origin_state;
mod page_state;

// Re-export main types
pub use origin_state::OriginState;
pub use page_state::PageState;
