//! Title cleanup so article titles are safe as filename prefixes.

/// Longest cleaned title in bytes; leaves room for `" (N)_index.ext"` under NAME_MAX.
const MAX_TITLE_BYTES: usize = 200;

/// Sanitizes a raw article title (or artist name) for use in a filename.
///
/// - Replaces `\ / : * ? " < > |` and control characters with `_`
/// - Trims leading/trailing whitespace and dots
/// - Limits length to 200 bytes on a char boundary
///
/// Interior spaces are kept, so `"Update (1)"` stays readable.
pub fn sanitize_title(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');

    if trimmed.len() > MAX_TITLE_BYTES {
        let mut take = MAX_TITLE_BYTES;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].trim_end().to_string()
    } else {
        trimmed.to_string()
    }
}
