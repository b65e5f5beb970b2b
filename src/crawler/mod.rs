//! Crawler module for mirroring remote directory trees
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` seam and its HTTP implementation
//! - Directory-listing parsing
//! - Single-file downloads with retry and skip-if-exists
//! - Overall crawl coordination with bounded download concurrency

mod coordinator;
mod downloader;
mod fetcher;
mod listing;
mod parser;
mod retry;

#[cfg(test)]
mod mock;

pub use coordinator::{run_mirror, Crawler};
pub use downloader::{DownloadOutcome, DownloadTask, Downloader};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use listing::list_directory;
pub use parser::{parse_listing, ListingEntry};
pub use retry::RetryPolicy;
