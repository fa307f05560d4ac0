//! Substring search over script names
//!
//! Filtering never reorders: it runs after classification and keeps each
//! group's alphabetical order.

use std::sync::Arc;

use super::types::{RegistryView, ScriptFile};

/// Check if haystack contains needle using ASCII case-insensitive matching.
/// `needle_lower` must already be lowercase.
/// No allocation - O(n*m) worst case but typically much faster.
#[inline]
pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle_lower: &str) -> bool {
    let h = haystack.as_bytes();
    let n = needle_lower.as_bytes();
    if n.is_empty() {
        return true;
    }
    if n.len() > h.len() {
        return false;
    }
    'outer: for i in 0..=(h.len() - n.len()) {
        for j in 0..n.len() {
            if h[i + j].to_ascii_lowercase() != n[j] {
                continue 'outer;
            }
        }
        return true;
    }
    false
}

/// Case-insensitive substring test. Falls back to full Unicode lowercasing
/// only when either side is non-ASCII.
pub(crate) fn name_matches(name: &str, query_lower: &str) -> bool {
    if name.is_ascii() && query_lower.is_ascii() {
        contains_ignore_ascii_case(name, query_lower)
    } else {
        name.to_lowercase().contains(query_lower)
    }
}

/// Keep the scripts whose name contains `query`, ignoring case.
///
/// An absent or empty query returns the input unchanged.
pub fn filter_scripts(files: &[Arc<ScriptFile>], query: Option<&str>) -> Vec<Arc<ScriptFile>> {
    let query = match query {
        Some(q) if !q.is_empty() => q,
        _ => return files.to_vec(),
    };
    let query_lower = query.to_lowercase();

    files
        .iter()
        .filter(|f| name_matches(&f.name, &query_lower))
        .cloned()
        .collect()
}

/// Filter both groups of a view independently
pub fn apply_filter(view: &RegistryView, query: Option<&str>) -> RegistryView {
    RegistryView {
        favorites: filter_scripts(&view.favorites, query),
        standard: filter_scripts(&view.standard, query),
    }
}
