//! Common utilities and helper functions
//!
//! Text helpers shared by the crawler, the converter and the translation layer.
//! All length limits are counted in characters, never bytes, since most of the
//! handled text is Thai or Chinese.

pub mod error;

use regex::Regex;
use std::sync::OnceLock;

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Remove HTML tags and decode entities, collapsing the remaining whitespace
pub fn strip_html_tags(html: &str) -> String {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();

    let re = TAG_RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid regex pattern"));

    let without_tags = re.replace_all(html, " ");
    let decoded = html_escape::decode_html_entities(&without_tags);
    normalize_whitespace(&decoded)
}

/// Truncate text to at most `max_chars` characters, appending `...` when cut
///
/// The suffix is appended after the kept characters, so a truncated result is
/// `max_chars + 3` characters long.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
    }
}

/// Prefix of `text` with at most `max_chars` characters, for log fields
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        None => text,
        Some((byte_idx, _)) => &text[..byte_idx],
    }
}

/// True when the string is empty or only whitespace
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("hello\n\nworld"), "hello world");
    }

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(
            strip_html_tags("<p>Hello <b>world</b> &amp; friends</p>"),
            "Hello world & friends"
        );
        assert_eq!(strip_html_tags("plain"), "plain");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("very long text here", 9), "very long...");
        assert_eq!(truncate_chars("ข่าวทดสอบ", 4), "ข่าว...");
        assert_eq!(truncate_chars("中文内容", 4), "中文内容");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("泰国新闻摘要", 2), "泰国");
        assert_eq!(preview("abc", 10), "abc");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank("   \n"));
        assert!(!is_blank(" a "));
    }

    proptest! {
        #[test]
        fn truncate_never_exceeds_limit(s in "\\PC{0,200}", max in 0usize..100) {
            let out = truncate_chars(&s, max);
            prop_assert!(out.chars().count() <= max + 3);
            if s.chars().count() <= max {
                prop_assert_eq!(out, s);
            }
        }
    }
}
