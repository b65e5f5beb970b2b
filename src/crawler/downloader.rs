//! Single-file downloader
//!
//! Materializes one remote file at one local path:
//! - Skips files that already exist with a non-zero size (resumable crawls)
//! - Creates missing parent directories
//! - Retries failed attempts with exponential backoff
//! - Never leaves an empty or partial file behind on failure

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::retry::RetryPolicy;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use url::Url;

/// One file to download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Remote URL of the file body
    pub source_url: Url,

    /// Where the file is written
    pub dest_path: PathBuf,
}

/// How a download ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was fetched and written
    Downloaded {
        /// Size of the written file
        bytes: u64,
    },

    /// The file already existed locally; no request was made
    Skipped,

    /// Every attempt failed
    Failed {
        /// Number of attempts made
        attempts: u32,
        /// Error of the last attempt
        error: String,
    },
}

impl DownloadOutcome {
    /// Returns true if the file is present locally after the download
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Downloaded { .. } | Self::Skipped)
    }
}

/// Why a single attempt failed
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("empty response body")]
    EmptyBody,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads files through a shared `Fetcher`
pub struct Downloader<F> {
    fetcher: Arc<F>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl<F> Clone for Downloader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            timeout: self.timeout,
            retry: self.retry,
        }
    }
}

impl<F: Fetcher> Downloader<F> {
    /// Creates a downloader
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher used for file bodies
    /// * `timeout` - Per-attempt timeout
    /// * `retry` - Retry schedule for failed attempts
    pub fn new(fetcher: Arc<F>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            fetcher,
            timeout,
            retry,
        }
    }

    /// Downloads `task.source_url` to `task.dest_path`
    ///
    /// # Returns
    ///
    /// * `DownloadOutcome::Skipped` - The destination already holds a non-empty file
    /// * `DownloadOutcome::Downloaded` - The body was fetched and written
    /// * `DownloadOutcome::Failed` - All attempts failed; nothing is left at the destination
    pub async fn download(&self, task: &DownloadTask) -> DownloadOutcome {
        if is_already_present(&task.dest_path).await {
            tracing::info!("⏭ {} (already exists)", task.dest_path.display());
            return DownloadOutcome::Skipped;
        }

        let mut attempt = 0u32;
        loop {
            match self.attempt(task).await {
                Ok(bytes) => {
                    tracing::info!("✓ {} ({} bytes)", task.dest_path.display(), bytes);
                    return DownloadOutcome::Downloaded { bytes };
                }
                Err(e) => {
                    remove_partial(&task.dest_path).await;

                    match self.retry.backoff(attempt) {
                        Some(delay) => {
                            tracing::warn!(
                                "⚠ Attempt {} failed for {}: {}; retrying in {:?}",
                                attempt + 1,
                                task.source_url,
                                e,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        None => {
                            tracing::error!(
                                "✗ Failed to download {} after {} attempts: {}",
                                task.source_url,
                                attempt + 1,
                                e
                            );
                            return DownloadOutcome::Failed {
                                attempts: attempt + 1,
                                error: e.to_string(),
                            };
                        }
                    }
                }
            }
        }
    }

    /// Makes one fetch-and-write attempt, returning the number of bytes written
    async fn attempt(&self, task: &DownloadTask) -> Result<u64, AttemptError> {
        if let Some(parent) = task.dest_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let body = self.fetcher.fetch(&task.source_url, self.timeout).await?;
        if body.is_empty() {
            return Err(AttemptError::EmptyBody);
        }

        fs::write(&task.dest_path, &body).await?;
        Ok(body.len() as u64)
    }
}

/// True if `path` is a regular file with a non-zero size
async fn is_already_present(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Removes whatever a failed attempt left at `path`
async fn remove_partial(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => tracing::debug!("Removed partial file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Could not remove partial file {}: {}", path.display(), e),
    }
}
