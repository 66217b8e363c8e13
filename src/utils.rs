//! Utility functions for text normalization, string shortening, and file system checks.
//!
//! - Whitespace normalization for segmented titles and descriptions
//! - String truncation for logging and console previews
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize whitespace in a piece of extracted text.
///
/// Newlines and tabs are removed outright (so a word wrapped across lines in
/// the markup is rejoined), remaining whitespace runs collapse to one space,
/// and the result is trimmed.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_text("  Politiet\n\tblev   kaldt "), "Politietblev kaldt");
/// ```
pub fn normalize_text(raw: &str) -> String {
    let stripped = raw.replace(['\n', '\t'], "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Normalize a sub-article title: [`normalize_text`] plus removal of a
/// single trailing colon.
///
/// Only one colon is removed, so a title ending in `::` keeps its last
/// colon (`"Kl. 12::"` gives `"Kl. 12:"`). Normalizing that result again
/// strips the remaining one; titles with at most one trailing colon are
/// stable under repeated normalization.
pub fn normalize_title(raw: &str) -> String {
    let mut title = normalize_text(raw);
    if title.ends_with(':') {
        title.pop();
        title.truncate(title.trim_end().len());
    }
    title
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Shorten a description for console output, keeping `edge` characters from
/// each end around an ellipsis. Strings up to `2 * edge` characters are
/// returned unchanged.
pub fn preview(s: &str, edge: usize) -> String {
    let count = s.chars().count();
    if count <= edge * 2 {
        return s.to_string();
    }
    let head: String = s.chars().take(edge).collect();
    let tail: String = s.chars().skip(count - edge).collect();
    format!("{head} ... {tail}")
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
