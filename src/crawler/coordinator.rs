//! Crawler coordinator - main crawl orchestration logic
//!
//! This module walks the remote tree depth-first:
//! - Resolving each directory's listing URL and guarding against revisits
//! - Fetching and parsing listings
//! - Dispatching the files of one directory to a bounded pool of download
//!   tasks and waiting for all of them before moving on
//! - Descending into sub-directories in sorted order
//! - Stopping cleanly when cancellation is requested

use crate::config::Config;
use crate::crawler::downloader::{DownloadTask, Downloader};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::listing::list_directory;
use crate::crawler::parser::ListingEntry;
use crate::crawler::retry::RetryPolicy;
use crate::state::{CrawlReport, CrawlState};
use crate::url::{local_path, resolver_for, validate_base_url, UrlResolver};
use crate::MirrorError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Main crawler structure
pub struct Crawler<F: Fetcher> {
    fetcher: Arc<F>,
    downloader: Downloader<F>,
    resolver: Box<dyn UrlResolver>,
    /// Bounds the number of downloads in flight
    semaphore: Arc<Semaphore>,
    listing_timeout: Duration,
    cancel: CancellationToken,
    state: CrawlState,
}

impl<F: Fetcher> Crawler<F> {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `base_url` - Validated directory URL to start from (ends with `/`)
    /// * `dest_root` - Local directory the tree is mirrored into
    /// * `config` - The mirror configuration
    /// * `fetcher` - The fetcher used for listings and file bodies
    /// * `cancel` - Token that stops the crawl from scheduling new work
    pub fn new(
        base_url: url::Url,
        dest_root: PathBuf,
        config: &Config,
        fetcher: Arc<F>,
        cancel: CancellationToken,
    ) -> Self {
        let state = CrawlState::new(dest_root, config.crawler.max_concurrency.max(1));
        let downloader = Downloader::new(
            Arc::clone(&fetcher),
            config.fetch.download_timeout(),
            RetryPolicy::from_config(&config.retry),
        );

        Self {
            fetcher,
            downloader,
            resolver: resolver_for(&base_url),
            semaphore: Arc::new(Semaphore::new(state.max_concurrency)),
            listing_timeout: config.fetch.listing_timeout(),
            cancel,
            state,
        }
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Directories are explored from an explicit stack so the traversal is
    /// depth-first and left-to-right: a sub-directory's whole subtree is done
    /// before its next sibling starts.
    pub async fn run(&mut self) -> CrawlReport {
        let start_time = Instant::now();
        let mut pending = vec![String::new()];

        while let Some(dir_path) = pending.pop() {
            if self.cancel.is_cancelled() {
                self.state.cancelled = true;
                break;
            }

            let subdirectories = self.crawl_directory(&dir_path).await;
            pending.extend(subdirectories.into_iter().rev());
        }

        if self.cancel.is_cancelled() {
            self.state.cancelled = true;
        }

        self.state.report(start_time.elapsed())
    }

    /// Explores one directory and returns the paths of its sub-directories
    async fn crawl_directory(&mut self, dir_path: &str) -> Vec<String> {
        let Some(url) = self.resolver.listing_url(dir_path) else {
            tracing::warn!("Skipping directory outside the mirror root: {}", dir_path);
            self.state.rejected_entries += 1;
            return Vec::new();
        };

        if !self.state.mark_visited(&url) {
            tracing::debug!("Already explored {}", url);
            return Vec::new();
        }

        tracing::info!("🔍 Exploring: {}", url);
        let entries = list_directory(self.fetcher.as_ref(), &url, self.listing_timeout).await;

        if entries.is_empty() {
            tracing::warn!("⚠ No entries found in {}", url);
            self.state.empty_directories += 1;
            return Vec::new();
        }

        let (directories, files): (Vec<ListingEntry>, Vec<ListingEntry>) =
            entries.into_iter().partition(|entry| entry.is_directory);

        if !files.is_empty() {
            tracing::info!("📁 {} files found in {}", files.len(), url);
            self.download_files(dir_path, &files).await;
        }

        directories
            .iter()
            .map(|entry| entry.path_in(dir_path))
            .collect()
    }

    /// Downloads the files of one directory and waits for all of them
    ///
    /// A download task that panics counts as a failed file; its siblings
    /// keep running.
    async fn download_files(&mut self, dir_path: &str, files: &[ListingEntry]) {
        let mut downloads = JoinSet::new();

        for entry in files {
            let relative = entry.path_in(dir_path);
            let Some(task) = self.download_task(&relative) else {
                tracing::warn!("Skipping entry outside the mirror root: {}", relative);
                self.state.rejected_entries += 1;
                continue;
            };

            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                permit = Arc::clone(&self.semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                tracing::info!("Cancellation requested, not scheduling further downloads");
                self.state.cancelled = true;
                break;
            };

            let downloader = self.downloader.clone();
            downloads.spawn(async move {
                let _permit = permit;
                downloader.download(&task).await
            });
        }

        while let Some(joined) = downloads.join_next().await {
            match joined {
                Ok(outcome) => self.state.record(&outcome),
                Err(e) => {
                    tracing::error!("✗ Download task in {} aborted: {}", dir_path, e);
                    self.state.failed += 1;
                }
            }
        }
    }

    /// Builds the download task for a file path relative to the crawl root
    fn download_task(&self, relative: &str) -> Option<DownloadTask> {
        Some(DownloadTask {
            source_url: self.resolver.file_url(relative)?,
            dest_path: local_path(&self.state.dest_root, relative)?,
        })
    }
}

/// Mirrors the remote directory at `base_url` into `dest_dir`
///
/// This function orchestrates a whole run:
///
/// 1. Validate the base URL (scheme and host) and add a trailing `/`
/// 2. Create the destination directory
/// 3. Crawl the remote tree
/// 4. Report the elapsed time
///
/// Cancellation through `cancel` is a clean stop: the returned report has
/// `cancelled` set and everything downloaded so far stays on disk.
///
/// # Example
///
/// ```no_run
/// use cdn_mirror::config::Config;
/// use cdn_mirror::crawler::{run_mirror, HttpFetcher};
/// use std::path::Path;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
/// let report = run_mirror(
///     "https://cdn.jsdelivr.net/npm/brython@3/",
///     Path::new("./lib/brython"),
///     &config,
///     fetcher,
///     CancellationToken::new(),
/// )
/// .await?;
/// println!("{} files downloaded", report.downloaded);
/// # Ok(())
/// # }
/// ```
pub async fn run_mirror<F: Fetcher>(
    base_url: &str,
    dest_dir: &Path,
    config: &Config,
    fetcher: Arc<F>,
    cancel: CancellationToken,
) -> Result<CrawlReport, MirrorError> {
    let base_url = validate_base_url(base_url)?;
    tokio::fs::create_dir_all(dest_dir).await?;

    tracing::info!(
        "🚀 Starting recursive download of {} into {}",
        base_url,
        dest_dir.display()
    );

    let mut crawler = Crawler::new(
        base_url,
        dest_dir.to_path_buf(),
        config,
        fetcher,
        cancel,
    );
    let report = crawler.run().await;

    if report.cancelled {
        tracing::warn!(
            "⚠ Download interrupted by user after {:.2}s",
            report.elapsed.as_secs_f64()
        );
    } else {
        tracing::info!(
            "✅ Download finished in {:.2}s",
            report.elapsed.as_secs_f64()
        );
    }

    Ok(report)
}
