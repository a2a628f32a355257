//! Small helpers shared across the scraper.
//!
//! - Whitespace normalization for extracted field text
//! - String truncation for log previews
//! - Output path preparation

use itertools::Itertools;
use std::path::Path;
use tracing::{debug, instrument};

/// Collapse every run of whitespace to a single space and trim both ends.
///
/// Newlines and tabs count as whitespace, so the result never contains
/// them. Idempotent: normalizing an already-normalized string returns it
/// unchanged.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_whitespace(" a   b\n c "), "a b c");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to the nearest
/// character boundary, so multi-byte text is safe) with an ellipsis and a
/// count of the dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Make sure the directory that will hold `path` exists.
///
/// A bare file name (no parent component) needs nothing.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            debug!(dir = %parent.display(), "Output directory ready");
            Ok(())
        }
        _ => Ok(()),
    }
}
