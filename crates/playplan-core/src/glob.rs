//! Single-level glob expansion.
//!
//! Only `*` is special, and only within one path segment. `**` is rejected.

use crate::error::{PlayplanError, Result};
use crate::ports::FileSystem;
use regex::Regex;
use std::path::{Path, PathBuf};

pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains('*')
}

/// Anchored matcher for one path segment: metacharacters escaped, `*` → `.*`.
pub fn segment_regex(segment: &str) -> Result<Regex> {
    let body = regex::escape(segment).replace(r"\*", ".*");
    Regex::new(&format!("^{body}$")).map_err(|e| PlayplanError::InvalidGlob {
        segment: segment.to_string(),
        reason: e.to_string(),
    })
}

/// Expand `pattern` into concrete file paths.
///
/// A pattern without `*` is returned as-is; it need not exist. Otherwise
/// segments are expanded breadth-first, hidden entries are never matched,
/// only regular files survive, and the result is sorted.
pub fn expand(pattern: &str, fs: &dyn FileSystem) -> Result<Vec<PathBuf>> {
    if !has_wildcard(pattern) {
        return Ok(vec![PathBuf::from(pattern)]);
    }
    if pattern.contains("**") {
        return Err(PlayplanError::RecursiveGlob(pattern.to_string()));
    }

    let root = if pattern.starts_with('/') {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    };
    let mut candidates = vec![root];

    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        if !has_wildcard(segment) {
            for candidate in &mut candidates {
                candidate.push(segment);
            }
            continue;
        }

        let matcher = segment_regex(segment)?;
        let mut next = Vec::new();
        for dir in &candidates {
            let listing: &Path = if dir.as_os_str().is_empty() {
                Path::new(".")
            } else {
                dir
            };
            // Missing or unreadable directories simply contribute nothing.
            let Ok(mut names) = fs.read_dir_names(listing) else {
                continue;
            };
            names.sort();
            for name in names {
                if name.starts_with('.') || !matcher.is_match(&name) {
                    continue;
                }
                next.push(dir.join(&name));
            }
        }

        if next.is_empty() {
            tracing::debug!(pattern, segment, "glob segment matched nothing");
            return Ok(Vec::new());
        }
        candidates = next;
    }

    let mut files: Vec<PathBuf> = candidates.into_iter().filter(|p| fs.is_file(p)).collect();
    files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    files.dedup();
    Ok(files)
}
