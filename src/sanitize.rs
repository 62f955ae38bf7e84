//! Folder and file name sanitization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Returned when a value has nothing usable left
pub const FALLBACK_NAME: &str = "Unnamed";

/// Characters Windows refuses in names, plus control characters other than
/// whitespace
static RESERVED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x08\x0E-\x1F\x7F]"#).unwrap());

/// Textual marker spreadsheets and dataframes use for a missing number
pub(crate) fn is_nan_marker(text: &str) -> bool {
    text.eq_ignore_ascii_case("nan")
}

/// Map arbitrary text to a single filesystem-safe path segment.
///
/// Never fails and never returns an empty string. Reserved characters become
/// `_`, whitespace runs collapse to one space, and empty or `nan` values
/// become [`FALLBACK_NAME`]. Segments made only of dots also fall back so the
/// result can never refer to a parent directory.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() || is_nan_marker(text) {
        return FALLBACK_NAME.to_string();
    }

    let replaced = RESERVED.replace_all(text, "_");
    let cleaned = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() || is_nan_marker(&cleaned) || cleaned.chars().all(|c| c == '.') {
        return FALLBACK_NAME.to_string();
    }

    cleaned
}
