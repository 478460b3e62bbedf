//! Trailing path segment extraction.

/// Returns the final `/`-delimited segment of `entry`, taken from the raw
/// text. The result may be empty.
///
/// When `entry` parses as a URL with a query or fragment, that tail is cut
/// first so `?token=..` never ends up in the name. A URL without a path
/// (`http://host`) yields its host part, like any other final segment.
pub fn trailing_segment(entry: &str) -> &str {
    let head = match url::Url::parse(entry) {
        Ok(parsed) if parsed.query().is_some() || parsed.fragment().is_some() => {
            let end = entry.find(['?', '#']).unwrap_or(entry.len());
            &entry[..end]
        }
        _ => entry,
    };
    head.rsplit('/').next().unwrap_or("")
}
