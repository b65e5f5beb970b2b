//! Joining listing-relative paths onto URLs and local directories
//!
//! Relative paths are built from decoded listing names (`sub/`, `sub/b.css`),
//! so they are split into segments and re-encoded one segment at a time
//! instead of being handed to `Url::join` as raw text.

use std::path::{Path, PathBuf};
use url::Url;

/// Splits a relative path into its meaningful segments
///
/// Empty and `.` segments are dropped. Returns `None` if any segment is `..`,
/// so a listing can never point outside the tree being mirrored.
pub fn relative_segments(relative: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }
    Some(segments)
}

/// Joins a relative path onto a directory URL
///
/// `base` must be a directory URL (ending in `/`). A relative path ending in
/// `/` yields a directory URL as well.
///
/// # Examples
///
/// ```
/// use cdn_mirror::url::join_url;
/// use url::Url;
///
/// let base = Url::parse("https://cdn.example.com/pkg/1.0/").unwrap();
/// let url = join_url(&base, "sub/my file.js").unwrap();
/// assert_eq!(url.as_str(), "https://cdn.example.com/pkg/1.0/sub/my%20file.js");
/// ```
pub fn join_url(base: &Url, relative: &str) -> Option<Url> {
    let segments = relative_segments(relative)?;
    if segments.is_empty() {
        return Some(base.clone());
    }

    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().ok()?;
        path.pop_if_empty();
        path.extend(segments);
        if relative.ends_with('/') {
            path.push("");
        }
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

/// Maps a relative path onto the local destination root
pub fn local_path(root: &Path, relative: &str) -> Option<PathBuf> {
    let segments = relative_segments(relative)?;
    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    Some(path)
}
