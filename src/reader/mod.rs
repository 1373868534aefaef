//! Read-time language selection
//!
//! Picks the variant shown for a requested language. Untranslated Thai is never
//! surfaced: when no variant exists for Thai content, a placeholder is returned
//! instead.

use serde::Serialize;

use crate::language::{LanguageClassifier, Script};
use crate::models::{Language, News, Post};
use crate::utils::is_blank;

pub const ZH_TITLE_PLACEHOLDER: &str = "[帖子标题翻译中...]";
pub const ZH_BODY_PLACEHOLDER: &str = "[帖子内容翻译中...]";
pub const EN_TITLE_PLACEHOLDER: &str = "[Post title translating...]";
pub const EN_BODY_PLACEHOLDER: &str = "[Post content translating...]";
pub const NO_CONTENT: &str = "No content available";

/// Title and body resolved for one reader language
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedView {
    pub title: String,
    pub body: String,
}

struct Variants<'a> {
    original: &'a str,
    zh: Option<&'a str>,
    en: Option<&'a str>,
}

impl LocalizedView {
    /// View of a post for `lang`
    pub fn for_post(post: &Post, lang: Language) -> Self {
        Self::resolve(
            Variants {
                original: &post.title,
                zh: post.title_zh.as_deref(),
                en: post.title_en.as_deref(),
            },
            Variants {
                original: &post.body,
                zh: post.body_zh.as_deref(),
                en: post.body_en.as_deref(),
            },
            lang,
        )
    }

    /// View of a news item for `lang`; the summary plays the body
    pub fn for_news(news: &News, lang: Language) -> Self {
        Self::resolve(
            Variants {
                original: &news.title,
                zh: news.title_zh.as_deref(),
                en: news.title_en.as_deref(),
            },
            Variants {
                original: news.summary.as_deref().unwrap_or(""),
                zh: news.summary_zh.as_deref(),
                en: news.summary_en.as_deref(),
            },
            lang,
        )
    }

    fn resolve(title: Variants<'_>, body: Variants<'_>, lang: Language) -> Self {
        let classifier = LanguageClassifier::default();
        let (title_placeholder, body_placeholder) = match lang {
            Language::Zh => (ZH_TITLE_PLACEHOLDER, ZH_BODY_PLACEHOLDER),
            Language::En | Language::Th | Language::Unknown => {
                (EN_TITLE_PLACEHOLDER, EN_BODY_PLACEHOLDER)
            }
        };

        let title = pick(&classifier, &title, lang, title_placeholder);
        let mut body = pick(&classifier, &body, lang, body_placeholder);
        if is_blank(&body) {
            body = if is_blank(&title) {
                NO_CONTENT.to_string()
            } else {
                title.clone()
            };
        }

        Self { title, body }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !is_blank(v))
}

/// Requested variant, then the other variant when the original is Thai, then
/// the original when it is not Thai, then the placeholder
fn pick(classifier: &LanguageClassifier, field: &Variants<'_>, lang: Language, placeholder: &str) -> String {
    let (preferred, other) = match lang {
        Language::Zh => (field.zh, field.en),
        Language::En | Language::Th | Language::Unknown => (field.en, field.zh),
    };

    if let Some(value) = non_blank(preferred) {
        return value.to_string();
    }

    let has_thai = classifier.contains_script(field.original, Script::Thai);
    if has_thai {
        return non_blank(other).unwrap_or(placeholder).to_string();
    }

    if is_blank(field.original) {
        return non_blank(other).unwrap_or("").to_string();
    }
    field.original.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thai_post() -> Post {
        Post::new("system", "ข่าวทดสอบ", "เนื้อหาข่าว")
    }

    #[test]
    fn test_requested_variant_wins() {
        let mut post = thai_post();
        post.title_zh = Some("测试新闻".to_string());
        post.title_en = Some("Test news".to_string());
        post.body_zh = Some("新闻内容".to_string());

        let zh = LocalizedView::for_post(&post, Language::Zh);
        assert_eq!(zh.title, "测试新闻");
        assert_eq!(zh.body, "新闻内容");

        let en = LocalizedView::for_post(&post, Language::En);
        assert_eq!(en.title, "Test news");
        assert_eq!(en.body, "新闻内容");
    }

    #[test]
    fn test_thai_selector_never_surfaces_thai() {
        let mut post = thai_post();
        post.title_zh = Some("测试新闻".to_string());

        let view = LocalizedView::for_post(&post, Language::Th);
        assert_eq!(view.title, "测试新闻");
        assert_eq!(view.body, EN_BODY_PLACEHOLDER);
    }

    #[test]
    fn test_placeholders_for_untranslated_thai() {
        let post = thai_post();
        let zh = LocalizedView::for_post(&post, Language::Zh);
        assert_eq!(zh.title, ZH_TITLE_PLACEHOLDER);
        assert_eq!(zh.body, ZH_BODY_PLACEHOLDER);

        let en = LocalizedView::for_post(&post, Language::En);
        assert_eq!(en.title, EN_TITLE_PLACEHOLDER);
        assert_eq!(en.body, EN_BODY_PLACEHOLDER);
    }

    #[test]
    fn test_non_thai_original_is_shown() {
        let post = Post::new("alice", "Hello", "World");
        let view = LocalizedView::for_post(&post, Language::Zh);
        assert_eq!(view.title, "Hello");
        assert_eq!(view.body, "World");
    }

    #[test]
    fn test_empty_body_falls_back() {
        let post = Post::new("alice", "Hello", "");
        assert_eq!(LocalizedView::for_post(&post, Language::En).body, "Hello");

        let post = Post::new("alice", "", "");
        assert_eq!(LocalizedView::for_post(&post, Language::En).body, NO_CONTENT);
    }
}
