//! Small string helpers used when rendering log output.

/// Cut `s` to at most `max` characters, appending `...` if anything was cut.
///
/// Counts characters rather than bytes so multi-byte text (Cyrillic titles,
/// for instance) is never split inside a code point.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_preview("short", 100), "short");
/// assert_eq!(truncate_preview("abcdef", 3), "abc...");
/// ```
pub fn truncate_preview(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}...", &s[..cut]),
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_preview_short_string() {
        assert_eq!(truncate_preview("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_preview_exact_length_is_untouched() {
        let s = "a".repeat(100);
        assert_eq!(truncate_preview(&s, 100), s);
    }

    #[test]
    fn test_truncate_preview_long_string() {
        let s = "a".repeat(500);
        let result = truncate_preview(&s, 100);
        assert_eq!(result, format!("{}...", "a".repeat(100)));
    }

    #[test]
    fn test_truncate_preview_multibyte() {
        let s = "дизайн".repeat(30);
        let result = truncate_preview(&s, 100);
        assert_eq!(result.chars().count(), 103);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_squash_whitespace() {
        assert_eq!(squash_whitespace("  New\n  Web\tDesign  "), "New Web Design");
        assert_eq!(squash_whitespace(""), "");
    }
}
