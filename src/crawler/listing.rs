//! Fetching directory listings

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{parse_listing, ListingEntry};
use std::time::Duration;
use url::Url;

/// Fetches and parses the listing page at `url`
///
/// A failed fetch is logged and reported as an empty listing so the crawl
/// can carry on with the rest of the tree. Listing fetches are never
/// retried.
pub async fn list_directory<F: Fetcher>(
    fetcher: &F,
    url: &Url,
    timeout: Duration,
) -> Vec<ListingEntry> {
    match fetcher.fetch(url, timeout).await {
        Ok(body) => {
            let html = String::from_utf8_lossy(&body);
            let entries = parse_listing(&html, url);
            tracing::debug!("Parsed {} entries from {}", entries.len(), url);
            entries
        }
        Err(e) => {
            tracing::warn!("Failed to fetch listing {}: {}", url, e);
            Vec::new()
        }
    }
}
