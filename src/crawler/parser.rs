//! Directory-listing parser
//!
//! This module turns the HTML of a CDN directory index into listing entries:
//! - jsDelivr pages: anchors pointing into `/npm/<package>/...`
//! - Any other CDN: generic anchors, then bare `href` attributes naming a
//!   file with an extension
//!
//! The generic rules are best-effort. They fit the simple Apache/nginx style
//! indexes most CDNs serve and are not guaranteed correct for arbitrary
//! listing layouts.

use crate::url::Vendor;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// Prefixes that never start a file or directory name
const REJECTED_PREFIXES: &[&str] = &["http", "#", "?", "..", "mailto:", "javascript:"];

/// Names used by index pages for navigation rather than content
const CONTROL_NAMES: &[&str] = &[".", "..", "parent", "up"];

/// Href prefixes skipped by the jsDelivr rule
const SKIPPED_HREF_PREFIXES: &[&str] = &["#", "?", "mailto:", "javascript:"];

/// One file or sub-directory found on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingEntry {
    /// URL-decoded name, without the trailing `/` of directories
    pub name: String,

    /// Whether the entry is a sub-directory
    pub is_directory: bool,
}

impl ListingEntry {
    /// Builds an entry from its rendered form (`sub/` or `a.js`)
    pub fn from_rendered(rendered: &str) -> Self {
        match rendered.strip_suffix('/') {
            Some(name) => Self {
                name: name.to_string(),
                is_directory: true,
            },
            None => Self {
                name: rendered.to_string(),
                is_directory: false,
            },
        }
    }

    /// Path of this entry inside the directory at `dir_path`
    ///
    /// `dir_path` is empty for the crawl root or ends with `/`.
    pub fn path_in(&self, dir_path: &str) -> String {
        format!("{}{}", dir_path, self)
    }
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_directory {
            write!(f, "{}/", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Parses a directory listing page
///
/// The rule set is chosen by the vendor of `page_url`. Entries are
/// deduplicated and returned sorted by their rendered name.
///
/// # Example
///
/// ```
/// use cdn_mirror::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<a href="../">../</a><a href="a.js">a.js</a><a href="sub/">sub/</a>"#;
/// let page = Url::parse("https://cdn.example.com/pkg/1.0/").unwrap();
/// let names: Vec<String> = parse_listing(html, &page)
///     .iter()
///     .map(|entry| entry.to_string())
///     .collect();
/// assert_eq!(names, vec!["a.js", "sub/"]);
/// ```
pub fn parse_listing(html: &str, page_url: &Url) -> Vec<ListingEntry> {
    let document = Html::parse_document(html);
    let mut names = BTreeSet::new();

    match Vendor::detect(page_url) {
        Vendor::JsDelivr => collect_package_anchors(&document, &mut names),
        Vendor::Generic => {
            collect_generic_anchors(&document, &mut names);
            collect_bare_hrefs(&document, &mut names);
        }
    }

    names
        .iter()
        .map(|rendered| ListingEntry::from_rendered(rendered))
        .collect()
}

/// jsDelivr rule: anchors whose href is an absolute `/npm/` path
fn collect_package_anchors(document: &Html, names: &mut BTreeSet<String>) {
    let Ok(selector) = Selector::parse(r#"a[href^="/npm/"]"#) else {
        return;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if SKIPPED_HREF_PREFIXES.iter().any(|p| href.starts_with(p)) {
            continue;
        }

        let text = anchor_text(&element);
        if text.is_empty() {
            continue;
        }

        let segment = last_segment(href);
        let name = if !segment.is_empty() && segment != text {
            decode(segment)
        } else {
            text.trim_end_matches('/').to_string()
        };

        if is_control_name(&name) {
            continue;
        }

        if href.ends_with('/') {
            names.insert(format!("{}/", name));
        } else {
            names.insert(name);
        }
    }
}

/// Generic rule (a): every anchor with an href, named by its text
fn collect_generic_anchors(document: &Html, names: &mut BTreeSet<String>) {
    let Ok(selector) = Selector::parse("a[href]") else {
        return;
    };

    for element in document.select(&selector) {
        let text = anchor_text(&element);
        if text.is_empty() {
            continue;
        }

        let candidate = decode(&text);
        if is_valid_candidate(&candidate) {
            names.insert(candidate);
        }
    }
}

/// Generic rule (b): any href that ends in a file extension, named by its
/// last path segment
fn collect_bare_hrefs(document: &Html, names: &mut BTreeSet<String>) {
    let Ok(selector) = Selector::parse("[href]") else {
        return;
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !has_file_extension(href) {
            continue;
        }

        let candidate = decode(last_segment(href));
        if is_valid_candidate(&candidate) {
            names.insert(candidate);
        }
    }
}

/// Trimmed text content of an anchor
fn anchor_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// The part of an href after its last `/`
fn last_segment(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or("")
}

/// Percent-decodes a name, keeping it as-is if it does not decode to UTF-8
fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// True if `href` ends with `.` followed by one or more ASCII alphanumerics
fn has_file_extension(href: &str) -> bool {
    match href.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// True for empty names, navigation tokens and link-like names
fn is_control_name(name: &str) -> bool {
    let bare = name.trim_end_matches('/');
    bare.is_empty()
        || CONTROL_NAMES.contains(&bare)
        || REJECTED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Generic filter: not a control name, and either has a `.` or is a directory
fn is_valid_candidate(name: &str) -> bool {
    !is_control_name(name) && (name.contains('.') || name.ends_with('/'))
}
