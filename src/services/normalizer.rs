//! Input canonicalization shared by the submission path and the matcher.

/// Trims surrounding whitespace and lowercases.
///
/// Internal punctuation and internal whitespace runs are preserved, the
/// matcher compares raw substrings rather than tokens.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True when the input is empty or whitespace only.
pub fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}
