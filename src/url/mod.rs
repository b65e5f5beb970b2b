//! URL handling module for cdn-mirror
//!
//! This module provides base URL validation, CDN vendor detection,
//! segment-safe path joining and the resolvers that map listing entries to
//! the remote URLs their bodies are fetched from.

mod path;
mod resolver;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use path::{join_url, local_path, relative_segments};
pub use resolver::{resolver_for, GenericResolver, PackageScopedResolver, UrlResolver};

/// CDN vendor families with distinct directory-listing layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    /// Plain index pages whose links are relative to the listing page
    Generic,
    /// jsDelivr: listing links are absolute `/npm/<package>/...` paths
    JsDelivr,
}

impl Vendor {
    /// Detects the vendor from the host of `url`
    ///
    /// # Examples
    ///
    /// ```
    /// use cdn_mirror::url::Vendor;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://cdn.jsdelivr.net/npm/brython@3/").unwrap();
    /// assert_eq!(Vendor::detect(&url), Vendor::JsDelivr);
    /// ```
    pub fn detect(url: &Url) -> Self {
        match url.host_str() {
            Some(host) if host == "jsdelivr.net" || host.ends_with(".jsdelivr.net") => {
                Self::JsDelivr
            }
            _ => Self::Generic,
        }
    }

    /// Returns true if listing paths are package-scoped rather than relative
    pub fn is_package_scoped(&self) -> bool {
        matches!(self, Self::JsDelivr)
    }
}

/// Validates a user-supplied base URL and normalizes it to end with `/`
///
/// The URL must parse, use the `http` or `https` scheme and carry a
/// non-empty host. No network access happens here.
///
/// # Examples
///
/// ```
/// use cdn_mirror::url::validate_base_url;
///
/// let url = validate_base_url("https://cdn.example.com/pkg/1.0").unwrap();
/// assert_eq!(url.as_str(), "https://cdn.example.com/pkg/1.0/");
/// assert!(validate_base_url("not-a-url").is_err());
/// ```
pub fn validate_base_url(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost(raw.to_string())),
    }

    Ok(with_trailing_slash(url))
}

/// Appends a trailing `/` to the path of `url` if it lacks one
pub fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
