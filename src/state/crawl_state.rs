//! Crawl state definitions
//!
//! One `CrawlState` belongs to exactly one crawl. It is only touched by the
//! crawler task; download tasks report back through their join handles.

use crate::crawler::DownloadOutcome;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Mutable state of a running crawl
#[derive(Debug)]
pub struct CrawlState {
    /// Directory URLs already explored
    visited: HashSet<Url>,

    /// The same URLs in the order they were first explored
    visit_order: Vec<Url>,

    /// Root of the local mirror
    pub dest_root: PathBuf,

    /// Maximum number of downloads in flight
    pub max_concurrency: usize,

    /// Files fetched and written
    pub downloaded: usize,

    /// Files that already existed locally
    pub skipped: usize,

    /// Files whose every attempt failed
    pub failed: usize,

    /// Bytes written by this run
    pub bytes_written: u64,

    /// Directories whose listing was empty or could not be fetched
    pub empty_directories: usize,

    /// Entries ignored because their path would leave the mirror root
    pub rejected_entries: usize,

    /// Whether the crawl stopped early on request
    pub cancelled: bool,
}

impl CrawlState {
    /// Creates an empty state for a crawl into `dest_root`
    pub fn new(dest_root: PathBuf, max_concurrency: usize) -> Self {
        Self {
            visited: HashSet::new(),
            visit_order: Vec::new(),
            dest_root,
            max_concurrency,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            bytes_written: 0,
            empty_directories: 0,
            rejected_entries: 0,
            cancelled: false,
        }
    }

    /// Marks `url` as visited
    ///
    /// Returns false if it had already been visited, in which case the
    /// caller must not explore it again.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if !self.visited.insert(url.clone()) {
            return false;
        }
        self.visit_order.push(url.clone());
        true
    }

    /// Returns true if `url` has been explored
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Number of explored directory URLs
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Folds one download outcome into the counters
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes_written += bytes;
            }
            DownloadOutcome::Skipped => self.skipped += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Snapshot of the crawl as a report
    pub fn report(&self, elapsed: Duration) -> CrawlReport {
        CrawlReport {
            visited: self.visit_order.clone(),
            downloaded: self.downloaded,
            skipped: self.skipped,
            failed: self.failed,
            bytes_written: self.bytes_written,
            empty_directories: self.empty_directories,
            rejected_entries: self.rejected_entries,
            cancelled: self.cancelled,
            elapsed,
        }
    }
}

/// Summary of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// Explored directory URLs, in exploration order
    pub visited: Vec<Url>,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_written: u64,
    pub empty_directories: usize,
    pub rejected_entries: usize,
    /// True if the crawl was interrupted before finishing
    pub cancelled: bool,
    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Files present locally at the end of the crawl because of this run
    pub fn files_ok(&self) -> usize {
        self.downloaded + self.skipped
    }
}
