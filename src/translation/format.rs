//! Structured post bodies and format-preserving rebuild
//!
//! Converted news posts carry fixed section markers (emoji + bold header). Only
//! the prose between the markers goes to the translator; the markers and the
//! trailing link line are put back verbatim around the translated text.
//!
//! ```text
//! 📝 **AI Summary**
//!
//! {summary}
//!
//! ---
//!
//! 📄 **Detailed Content**
//!
//! {content}
//!
//! ---
//!
//! 🔗 **Read Original**: {url}
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::utils::truncate_chars;

pub const AI_SUMMARY_HEADER: &str = "📝 **AI Summary**";
pub const NEWS_SUMMARY_HEADER: &str = "📝 **News Summary**";
pub const DETAIL_HEADER: &str = "📄 **Detailed Content**";
pub const READ_ORIGINAL_LABEL: &str = "🔗 **Read Original**:";
pub const SOURCE_LABEL: &str = "🔗 **Source**:";
pub const SECTION_RULE: &str = "\n\n---\n\n";

const DETAIL_MAX_CHARS: usize = 500;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:📝\s*\*\*(?:AI|News) Summary\*\*|📄\s*\*\*Detailed Content\*\*)\s*\n+")
        .expect("valid regex")
});
static LINK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^🔗\s*\*\*(?:Read Original|Source)\*\*:[^\n]*").expect("valid regex")
});
static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"---+\s*\n*").expect("valid regex"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Compose the structured body of a converted news post
///
/// The summary section falls back to the title when no summary exists; the
/// detail section is omitted without content; the trailing line links the
/// canonical URL, or names the source when there is no URL.
pub fn compose_body(
    title: &str,
    summary: Option<&str>,
    content: Option<&str>,
    url: Option<&str>,
    source: Option<&str>,
) -> String {
    let mut body = String::new();

    match summary.map(str::trim).filter(|s| !s.is_empty()) {
        Some(summary) => {
            body.push_str(AI_SUMMARY_HEADER);
            body.push_str("\n\n");
            body.push_str(summary);
        }
        None => {
            body.push_str(NEWS_SUMMARY_HEADER);
            body.push_str("\n\n");
            body.push_str(title.trim());
        }
    }
    body.push_str(SECTION_RULE);

    if let Some(content) = content.map(str::trim).filter(|c| !c.is_empty()) {
        body.push_str(DETAIL_HEADER);
        body.push_str("\n\n");
        body.push_str(&truncate_chars(content, DETAIL_MAX_CHARS));
        body.push_str(SECTION_RULE);
    }

    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => {
            body.push_str(READ_ORIGINAL_LABEL);
            body.push(' ');
            body.push_str(url);
        }
        None => {
            body.push_str(SOURCE_LABEL);
            body.push(' ');
            body.push_str(source.map(str::trim).filter(|s| !s.is_empty()).unwrap_or("Unknown"));
        }
    }

    body
}

/// Strip structural markers, leaving only the prose to translate
pub fn extract_actual_content(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }

    let content = HEADER_RE.replace_all(body, "");
    let content = LINK_LINE_RE.replace_all(&content, "");
    let content = RULE_RE.replace_all(&content, "");
    let content = URL_RE.replace_all(&content, "");
    let content = BOLD_RE.replace_all(&content, "$1");
    let content = BLANK_LINES_RE.replace_all(&content, "\n\n");

    content.trim().to_string()
}

/// Whether `body` carries a section header or a link line at a line start
pub fn is_structured(body: &str) -> bool {
    body.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with(AI_SUMMARY_HEADER)
            || line.starts_with(NEWS_SUMMARY_HEADER)
            || line.starts_with(DETAIL_HEADER)
    }) || LINK_LINE_RE.is_match(body)
}

/// Re-insert the original header and link line around translated prose
///
/// Only the matched link line is copied from the original. Unstructured
/// bodies return the translation unchanged.
pub fn rebuild_structured_body(original: &str, translated: &str) -> String {
    let translated = translated.trim();
    if !is_structured(original) {
        return translated.to_string();
    }

    let mut result = String::new();

    let header = [AI_SUMMARY_HEADER, NEWS_SUMMARY_HEADER, DETAIL_HEADER]
        .into_iter()
        .find(|h| original.contains(h));
    if let Some(header) = header {
        result.push_str(header);
        result.push_str("\n\n");
    }
    result.push_str(translated);

    if let Some(link_line) = LINK_LINE_RE.find(original) {
        result.push_str(SECTION_RULE);
        result.push_str(link_line.as_str().trim_end());
    }

    result
}
