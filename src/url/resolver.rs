//! Remote URL resolution for listing entries
//!
//! Directory listings are always fetched relative to the base URL, but where
//! a file body lives depends on the CDN: most vendors serve files next to the
//! listing page, while jsDelivr's listing paths are package-scoped and must
//! be rebuilt from the package path of the base URL.

use crate::url::{join_url, Vendor};
use std::fmt;
use url::Url;

/// Maps paths relative to the crawl root onto remote URLs
pub trait UrlResolver: fmt::Debug + Send + Sync {
    /// The vendor this resolver was built for
    fn vendor(&self) -> Vendor;

    /// The base URL the crawl started from
    fn base_url(&self) -> &Url;

    /// URL of the listing page for a directory path such as `sub/`
    fn listing_url(&self, dir_path: &str) -> Option<Url> {
        join_url(self.base_url(), dir_path)
    }

    /// URL a file body is downloaded from, for a path such as `sub/b.css`
    fn file_url(&self, file_path: &str) -> Option<Url>;
}

/// Resolves files next to their listing page
#[derive(Debug, Clone)]
pub struct GenericResolver {
    base: Url,
}

impl GenericResolver {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl UrlResolver for GenericResolver {
    fn vendor(&self) -> Vendor {
        Vendor::Generic
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn file_url(&self, file_path: &str) -> Option<Url> {
        join_url(&self.base, file_path)
    }
}

/// Resolves files under a jsDelivr `/npm/<package>/` root
///
/// The package root is the part of the base path after `/npm/`. When that
/// part has more than one component its last component is stripped, so
/// `/npm/brython@3/src/` resolves files under `/npm/brython@3/`.
#[derive(Debug, Clone)]
pub struct PackageScopedResolver {
    base: Url,
    package_root: Url,
}

impl PackageScopedResolver {
    const PACKAGE_PREFIX: &'static str = "/npm/";

    /// Builds the resolver, or returns `None` if `base` is not an `/npm/` URL
    pub fn new(base: Url) -> Option<Self> {
        let package_path = base
            .path()
            .strip_prefix(Self::PACKAGE_PREFIX)?
            .trim_matches('/');
        if package_path.is_empty() {
            return None;
        }

        let package_path = match package_path.rsplit_once('/') {
            Some((parent, _last)) => parent,
            None => package_path,
        };

        let package_root = base
            .join(&format!("{}{}/", Self::PACKAGE_PREFIX, package_path))
            .ok()?;

        Some(Self { base, package_root })
    }

    pub fn package_root(&self) -> &Url {
        &self.package_root
    }
}

impl UrlResolver for PackageScopedResolver {
    fn vendor(&self) -> Vendor {
        Vendor::JsDelivr
    }

    fn base_url(&self) -> &Url {
        &self.base
    }

    fn file_url(&self, file_path: &str) -> Option<Url> {
        join_url(&self.package_root, file_path)
    }
}

/// Selects the resolver for a base URL by inspecting its host
pub fn resolver_for(base: &Url) -> Box<dyn UrlResolver> {
    match Vendor::detect(base) {
        Vendor::JsDelivr => match PackageScopedResolver::new(base.clone()) {
            Some(resolver) => Box::new(resolver),
            None => {
                tracing::warn!(
                    "{} is not an /npm/ package path, resolving files relative to listings",
                    base
                );
                Box::new(GenericResolver::new(base.clone()))
            }
        },
        Vendor::Generic => Box::new(GenericResolver::new(base.clone())),
    }
}
