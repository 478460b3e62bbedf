//! Base filename derivation for URL list entries.
//!
//! The base name is the URL's trailing `/`-segment, sanitized for Linux.
//! An entry without a usable trailing segment yields `None` and is skipped.

mod sanitize;
mod segment;

pub use sanitize::{fit_name_max, sanitize_segment, NAME_MAX};
pub use segment::trailing_segment;

/// Derives the base filename for `entry`, or `None` when it has no usable
/// trailing segment (blank line, `http://host/`, `.`/`..`).
///
/// # Examples
///
/// - `base_name("http://x/a.txt")` → `Some("a.txt")`
/// - `base_name("https://x/dir/file.zip?token=1")` → `Some("file.zip")`
/// - `base_name("https://x/dir/")` → `None`
pub fn base_name(entry: &str) -> Option<String> {
    let segment = trailing_segment(entry.trim());
    let name = sanitize_segment(segment);
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}
