//! News to community post conversion
//!
//! Conversion is idempotent on the exact post title: a news item whose title
//! already exists as a post is skipped. Two different news items that share a
//! title therefore collide, and only the first becomes a post.
//!
//! The title is translated from the item's language. The body is translated
//! from the language of its own prose, since the summary inside it may already
//! be Chinese.

use crate::error::Result;
use crate::models::{ConversionReport, Language, News, Post, PostStatus};
use crate::storage::{Page, SharedNewsRepository, SharedPostRepository};
use crate::translation::{compose_body, extract_actual_content, TranslationOrchestrator};
use crate::utils::{is_blank, preview};

/// Author recorded on converted posts
pub const SYSTEM_AUTHOR: &str = "system";

/// Category of converted posts
pub const NEWS_CATEGORY: &str = "News & Information";

/// Tag every converted post carries
pub const NEWS_TAG: &str = "News";

/// Keywords turned into tags when found in the title or summary
pub const KEYWORD_TAGS: &[&str] = &[
    "Thailand",
    "China",
    "Korea",
    "Study Abroad",
    "Visa",
    "Rental",
    "Food",
    "Travel",
    "Education",
    "University",
];

const SCAN_PAGE_SIZE: usize = 50;

/// Tags for a news item: `News`, the source, then matching keywords
pub fn tags_for(news: &News) -> Vec<String> {
    let mut tags = vec![NEWS_TAG.to_string()];
    if !is_blank(&news.source) && !tags.contains(&news.source) {
        tags.push(news.source.clone());
    }

    let haystack = format!("{} {}", news.title, news.summary.as_deref().unwrap_or(""))
        .to_lowercase();
    for keyword in KEYWORD_TAGS {
        if haystack.contains(&keyword.to_lowercase()) && !tags.iter().any(|t| t == keyword) {
            tags.push((*keyword).to_string());
        }
    }

    tags
}

/// Turns stored news into approved, translated posts
pub struct NewsToPostConverter {
    news: SharedNewsRepository,
    posts: SharedPostRepository,
    translator: TranslationOrchestrator,
}

impl NewsToPostConverter {
    pub fn new(
        news: SharedNewsRepository,
        posts: SharedPostRepository,
        translator: TranslationOrchestrator,
    ) -> Self {
        Self {
            news,
            posts,
            translator,
        }
    }

    /// Build the post for a news item without persisting it
    pub fn build_post(news: &News) -> Post {
        let body = compose_body(
            &news.title,
            news.summary.as_deref(),
            news.content.as_deref(),
            Some(news.canonical_url.as_str()),
            Some(news.source.as_str()),
        );

        let mut post = Post::new(SYSTEM_AUTHOR, news.title.clone(), body);
        post.original_language = news.original_language;
        post.status = PostStatus::Approved;
        post.category = NEWS_CATEGORY.to_string();
        post.tags = tags_for(news);
        post
    }

    /// Convert one item; `Ok(None)` when it is skipped
    pub async fn convert(&self, news: &News) -> Result<Option<Post>> {
        if is_blank(&news.title) {
            tracing::debug!(news_id = %news.id, "Skipping news without title");
            return Ok(None);
        }

        if !self.posts.find_by_title(&news.title)?.is_empty() {
            tracing::debug!(title = %preview(&news.title, 40), "Post already exists, skipping");
            return Ok(None);
        }

        let mut post = Self::build_post(news);
        let body_source = match self
            .translator
            .classifier()
            .detect(&extract_actual_content(&post.body))
        {
            Language::Unknown => post.original_language,
            detected => detected,
        };
        let translation = self
            .translator
            .translate_with_sources(&post.title, post.original_language, &post.body, body_source)
            .await;
        post.apply_translation(translation);

        self.posts.save(&post)?;
        tracing::info!(
            post_id = %post.id,
            news_id = %news.id,
            title = %preview(&post.title, 40),
            "Converted news to post"
        );
        Ok(Some(post))
    }

    /// Convert up to `limit` unconverted items, newest first
    pub async fn convert_pending(&self, limit: usize) -> Result<ConversionReport> {
        let mut report = ConversionReport::default();
        let mut page = Page::first(SCAN_PAGE_SIZE);

        'scan: while report.success < limit {
            let batch = self.news.find_all(page)?;
            if batch.is_empty() {
                break;
            }

            for news in &batch {
                if report.success >= limit {
                    break 'scan;
                }
                report.total_processed += 1;

                match self.convert(news).await {
                    Ok(Some(_)) => report.success += 1,
                    Ok(None) => report.skipped += 1,
                    Err(e) => {
                        report.error += 1;
                        tracing::warn!(news_id = %news.id, error = %e, "Conversion failed");
                    }
                }
            }

            page.number += 1;
        }

        tracing::info!(
            total = report.total_processed,
            success = report.success,
            skipped = report.skipped,
            error = report.error,
            "Conversion batch finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageClassifier;
    use crate::llm::MockTextGenerator;
    use crate::models::Language;
    use crate::storage::create_in_memory_repositories;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn news(n: i64, title: &str) -> News {
        let url = format!("https://example.com/news/{n}");
        let now = Utc::now() + Duration::seconds(n);
        News {
            id: News::id_for_url(&url),
            title: title.to_string(),
            summary: Some("Visa rules for students in Thailand".to_string()),
            content: None,
            source: "Bangkok Post".to_string(),
            canonical_url: url,
            image_url: None,
            original_language: Language::En,
            title_zh: None,
            title_en: Some(title.to_string()),
            summary_zh: None,
            summary_en: None,
            published_at: now,
            created_at: now,
        }
    }

    fn converter(mock: Arc<MockTextGenerator>) -> (NewsToPostConverter, SharedNewsRepository, SharedPostRepository) {
        let (news_repo, post_repo) = create_in_memory_repositories();
        let translator = TranslationOrchestrator::new(mock, Arc::new(LanguageClassifier::default()));
        (
            NewsToPostConverter::new(news_repo.clone(), post_repo.clone(), translator),
            news_repo,
            post_repo,
        )
    }

    #[test]
    fn test_tags() {
        let tags = tags_for(&news(1, "University fees rise"));
        assert_eq!(tags, vec!["News", "Bangkok Post", "Thailand", "Visa", "University"]);
    }

    #[test]
    fn test_build_post() {
        let post = NewsToPostConverter::build_post(&news(1, "Headline"));
        assert_eq!(post.status, PostStatus::Approved);
        assert_eq!(post.author, SYSTEM_AUTHOR);
        assert_eq!(post.category, NEWS_CATEGORY);
        assert!(post.body.starts_with("📝 **AI Summary**\n\nVisa rules"));
        assert!(post.body.ends_with("🔗 **Read Original**: https://example.com/news/1"));
    }

    #[tokio::test]
    async fn test_convert_is_idempotent_on_title() {
        let (converter, _, posts) = converter(Arc::new(MockTextGenerator::fixed("标题和内容")));
        let item = news(1, "Same headline");

        assert!(converter.convert(&item).await.unwrap().is_some());
        assert!(converter.convert(&item).await.unwrap().is_none());

        let stored = posts.find_by_title("Same headline").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title_en.as_deref(), Some("Same headline"));
        assert_eq!(stored[0].title_zh.as_deref(), Some("标题和内容"));
    }

    #[tokio::test]
    async fn test_shared_title_converts_once() {
        let (converter, news_repo, posts) = converter(Arc::new(MockTextGenerator::fixed("新闻")));
        news_repo.save(&news(1, "Shared headline")).unwrap();
        news_repo.save(&news(2, "Shared headline")).unwrap();

        let report = converter.convert_pending(10).await.unwrap();
        assert_eq!(report.success, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(posts.find_by_title("Shared headline").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chinese_summary_is_not_translated_as_thai() {
        let mock = Arc::new(MockTextGenerator::new(|prompt| {
            let first_line = prompt.lines().next().unwrap_or_default();
            if first_line.ends_with("to Chinese.") {
                Ok(prompt.rsplit("Text to translate:\n").next().unwrap_or_default().to_string())
            } else {
                Ok("Test news".to_string())
            }
        }));
        let (converter, _, _) = converter(mock.clone());

        let mut item = news(1, "ข่าวทดสอบ");
        item.summary = Some("测试摘要内容".to_string());
        item.original_language = Language::Th;
        item.title_en = None;

        let post = converter.convert(&item).await.unwrap().unwrap();

        assert_eq!(post.body_zh.as_deref(), Some(post.body.as_str()));
        assert!(post.title_zh.is_none());
        assert_eq!(post.title_en.as_deref(), Some("Test news"));
        assert!(post.body_en.as_deref().unwrap().starts_with("📝 **AI Summary**\n\nTest news"));

        let prompts = mock.prompts();
        assert_eq!(mock.calls(), 3);
        assert!(prompts.iter().any(|p| p.contains("from Chinese to English.")));
        assert!(!prompts
            .iter()
            .any(|p| p.contains("from Thai to Chinese.") && p.contains("测试摘要内容")));
    }

    #[tokio::test]
    async fn test_convert_pending_respects_limit() {
        let (converter, news_repo, posts) = converter(Arc::new(MockTextGenerator::fixed("新闻")));
        for n in 0..5 {
            news_repo.save(&news(n, &format!("Headline {n}"))).unwrap();
        }
        news_repo.save(&news(9, "  ")).unwrap();

        let report = converter.convert_pending(2).await.unwrap();
        assert_eq!(report.success, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.total_processed, 3);

        let converted = posts.find_all(Page::first(10)).unwrap();
        let titles: Vec<_> = converted.iter().map(|p| p.title.as_str()).collect();
        assert!(titles.contains(&"Headline 4"));
        assert!(titles.contains(&"Headline 3"));

        let report = converter.convert_pending(10).await.unwrap();
        assert_eq!(report.success, 3);
        assert_eq!(report.skipped, 3);
        assert_eq!(posts.count_by_status(PostStatus::Approved).unwrap(), 5);
    }
}
