//! Linux-safe filename sanitization.

/// Linux NAME_MAX, in bytes.
pub const NAME_MAX: usize = 255;

/// Makes a URL segment safe to use as a single path component.
///
/// - Replaces NUL, `\` and control characters with `_`
/// - Trims surrounding whitespace and trailing dots; leading dots are kept
/// - Limits length to [`NAME_MAX`] bytes
///
/// Everything else, spaces and percent-escapes included, is kept verbatim.
pub fn sanitize_segment(segment: &str) -> String {
    let replaced: String = segment
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim();
    // "." and ".." are left for the caller to reject.
    let trimmed = if trimmed == "." || trimmed == ".." {
        trimmed
    } else {
        trimmed.trim_end_matches(|c: char| c == '.' || c.is_whitespace())
    };
    truncate_at_boundary(trimmed, NAME_MAX).to_string()
}

/// Joins `base` and `suffix`, shortening `base` so the result fits in
/// [`NAME_MAX`] bytes.
pub fn fit_name_max(base: &str, suffix: &str) -> String {
    let room = NAME_MAX.saturating_sub(suffix.len());
    let mut out = truncate_at_boundary(base, room).to_string();
    out.push_str(suffix);
    out
}

fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut take = max;
    while take > 0 && !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}
