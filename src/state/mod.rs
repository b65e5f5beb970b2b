//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: The visited set and counters owned by one crawl
//! - `CrawlReport`: What a finished (or interrupted) crawl hands back

mod crawl_state;

// Re-export main types
pub use crawl_state::{CrawlReport, CrawlState};
