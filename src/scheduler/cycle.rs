//! One ingest cycle
//!
//! ```text
//! fetch ──▶ dedup by URL ──▶ body ──▶ summarize ──▶ translate ──▶ save
//!                                                                  │
//!                                            convert_pending ◀─────┘
//! ```
//!
//! Items are processed one at a time. A failed item is counted and left
//! unsaved, so the next cycle sees it as new again.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::converter::NewsToPostConverter;
use crate::crawler::{RawArticle, SharedArticleSource};
use crate::error::Result;
use crate::language::LanguageClassifier;
use crate::metrics;
use crate::models::{CycleReport, Language, News};
use crate::storage::SharedNewsRepository;
use crate::summary::Summarizer;
use crate::translation::TranslationOrchestrator;
use crate::utils::{is_blank, preview};

/// Default number of news items converted to posts after a cycle
pub const DEFAULT_CONVERSION_LIMIT: usize = 20;

/// Result of processing a single item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Saved { id: String },
    Skipped { reason: &'static str },
}

/// Scheduled and on-demand news pipeline
pub struct PipelineScheduler {
    source: SharedArticleSource,
    news: SharedNewsRepository,
    summarizer: Summarizer,
    translator: TranslationOrchestrator,
    converter: NewsToPostConverter,
    classifier: Arc<LanguageClassifier>,
    conversion_limit: usize,
    fetch_details: bool,
    cycle_lock: Mutex<()>,
}

impl PipelineScheduler {
    pub fn new(
        source: SharedArticleSource,
        news: SharedNewsRepository,
        summarizer: Summarizer,
        translator: TranslationOrchestrator,
        converter: NewsToPostConverter,
        classifier: Arc<LanguageClassifier>,
    ) -> Self {
        Self {
            source,
            news,
            summarizer,
            translator,
            converter,
            classifier,
            conversion_limit: DEFAULT_CONVERSION_LIMIT,
            fetch_details: true,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Cap the post conversion run after each cycle
    #[must_use]
    pub fn with_conversion_limit(mut self, limit: usize) -> Self {
        self.conversion_limit = limit;
        self
    }

    /// Enable or disable detail-page fetches for items without a body
    #[must_use]
    pub fn with_fetch_details(mut self, enabled: bool) -> Self {
        self.fetch_details = enabled;
        self
    }

    /// Run one full cycle
    ///
    /// This is both the scheduled body and the manual trigger. Concurrent calls
    /// wait for the running cycle to finish.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let _guard = self.cycle_lock.lock().await;
        let started = Instant::now();
        tracing::info!("Pipeline cycle started");

        let articles = self.source.fetch_articles().await;
        if articles.is_empty() {
            tracing::warn!("No articles fetched, cycle ends early");
            return Ok(CycleReport::default());
        }

        let mut report = CycleReport::default();
        for article in &articles {
            report.processed += 1;
            match self.process_item(article).await {
                Ok(ItemOutcome::Saved { id }) => {
                    report.success += 1;
                    tracing::info!(news_id = %id, title = %preview(&article.title, 40), source = %article.source, "News saved");
                }
                Ok(ItemOutcome::Skipped { reason }) => {
                    report.skipped += 1;
                    tracing::debug!(url = %article.url, reason, "News skipped");
                }
                Err(e) => {
                    report.error += 1;
                    tracing::warn!(url = %article.url, error = %e, "News item failed");
                }
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        metrics::record_cycle(report.processed, report.success, report.skipped, report.error, elapsed);
        tracing::info!(
            processed = report.processed,
            success = report.success,
            skipped = report.skipped,
            error = report.error,
            elapsed_secs = elapsed,
            "Pipeline cycle finished"
        );

        if let Err(e) = self.converter.convert_pending(self.conversion_limit).await {
            tracing::warn!(error = %e, "News to post conversion failed");
        }

        Ok(report)
    }

    /// Process a single fetched article
    pub async fn process_item(&self, article: &RawArticle) -> Result<ItemOutcome> {
        if self.news.exists_by_canonical_url(&article.url)? {
            return Ok(ItemOutcome::Skipped { reason: "duplicate_url" });
        }

        let content = match article.content.as_deref().filter(|c| !is_blank(c)) {
            Some(c) => Some(c.to_string()),
            None => self.fetch_body(article).await,
        };

        let summary = self
            .summarizer
            .summarize_item(&article.title, article.summary.as_deref(), content.as_deref())
            .await;

        let source_text = content
            .as_deref()
            .or(article.summary.as_deref())
            .unwrap_or("");
        let language = self
            .classifier
            .detect(&format!("{} {}", article.title, source_text));

        let mut news = News {
            id: News::id_for_url(&article.url),
            title: article.title.clone(),
            summary: Some(summary),
            content,
            source: article.source.clone(),
            canonical_url: article.url.clone(),
            image_url: article.image_url.clone(),
            original_language: language,
            title_zh: None,
            title_en: None,
            summary_zh: None,
            summary_en: None,
            published_at: article.published_at,
            created_at: Utc::now(),
        };
        self.translate(&mut news).await;

        match self.news.save(&news) {
            Ok(()) => Ok(ItemOutcome::Saved { id: news.id }),
            Err(e) if e.is_duplicate() => Ok(ItemOutcome::Skipped { reason: "duplicate_url" }),
            Err(e) => Err(e),
        }
    }

    async fn fetch_body(&self, article: &RawArticle) -> Option<String> {
        if !self.fetch_details {
            return None;
        }

        match self.source.fetch_body(&article.url).await {
            Ok(Some(body)) => {
                tracing::debug!(url = %article.url, chars = body.chars().count(), "Fetched article body");
                Some(body)
            }
            Ok(None) => {
                tracing::debug!(url = %article.url, "No body found on article page");
                None
            }
            Err(e) => {
                tracing::warn!(url = %article.url, error = %e, "Body fetch failed, using feed text");
                None
            }
        }
    }

    // Title translates from the item language, the summary from its own.
    async fn translate(&self, news: &mut News) {
        let summary = news.summary.clone().unwrap_or_default();
        let summary_language = match self.classifier.detect(&summary) {
            Language::Unknown => news.original_language,
            detected => detected,
        };

        for target in Language::TARGETS {
            let title = self
                .translator
                .translate_field(&news.title, news.original_language, target, "title")
                .await;
            let summary = self
                .translator
                .translate_field(&summary, summary_language, target, "summary")
                .await;

            match target {
                Language::Zh => {
                    news.title_zh = title;
                    news.summary_zh = summary;
                }
                Language::En => {
                    news.title_en = title;
                    news.summary_en = summary;
                }
                Language::Th | Language::Unknown => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ArticleSource;
    use crate::error::{Error, FetchError};
    use crate::llm::MockTextGenerator;
    use crate::storage::{create_in_memory_repositories, Page, SharedPostRepository};
    use async_trait::async_trait;

    struct StaticSource {
        articles: Vec<RawArticle>,
        body: Option<String>,
    }

    #[async_trait]
    impl ArticleSource for StaticSource {
        async fn fetch_articles(&self) -> Vec<RawArticle> {
            self.articles.clone()
        }

        async fn fetch_body(&self, _url: &str) -> Result<Option<String>> {
            match &self.body {
                Some(body) => Ok(Some(body.clone())),
                None => Err(Error::Fetch(FetchError::Timeout)),
            }
        }
    }

    fn article(n: u32, title: &str, summary: Option<&str>) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            summary: summary.map(str::to_string),
            content: None,
            url: format!("https://news.example.com/article/{n}"),
            image_url: None,
            published_at: Utc::now(),
            source: "Example".to_string(),
        }
    }

    /// Summaries in Chinese, translations by target
    fn responder() -> Arc<MockTextGenerator> {
        Arc::new(MockTextGenerator::new(|prompt| {
            let first_line = prompt.lines().next().unwrap_or_default();
            if prompt.starts_with("Please read") {
                Ok("测试摘要内容".to_string())
            } else if first_line.ends_with("to Chinese.") {
                Ok("测试新闻".to_string())
            } else {
                Ok("Test news".to_string())
            }
        }))
    }

    fn scheduler(
        articles: Vec<RawArticle>,
        body: Option<&str>,
        mock: Arc<MockTextGenerator>,
    ) -> (PipelineScheduler, SharedNewsRepository, SharedPostRepository) {
        let (news, posts) = create_in_memory_repositories();
        let classifier = Arc::new(LanguageClassifier::default());
        let translator = TranslationOrchestrator::new(mock.clone(), classifier.clone());
        let converter = NewsToPostConverter::new(news.clone(), posts.clone(), translator.clone());
        let source = Arc::new(StaticSource {
            articles,
            body: body.map(str::to_string),
        });
        let scheduler = PipelineScheduler::new(
            source,
            news.clone(),
            Summarizer::new(mock),
            translator,
            converter,
            classifier,
        );
        (scheduler, news, posts)
    }

    #[tokio::test]
    async fn test_thai_item_is_summarized_and_translated() {
        let (scheduler, news, _) = scheduler(vec![article(1, "ข่าวทดสอบ", None)], None, responder());

        let report = scheduler.run_cycle().await.unwrap();
        assert_eq!(report, CycleReport { processed: 1, success: 1, skipped: 0, error: 0 });

        let stored = news
            .find_by_canonical_url("https://news.example.com/article/1")
            .unwrap()
            .unwrap();
        assert_eq!(stored.original_language, Language::Th);
        assert_eq!(stored.summary.as_deref(), Some("测试摘要内容"));
        assert_eq!(stored.title_zh.as_deref(), Some("测试新闻"));
        assert_eq!(stored.title_en.as_deref(), Some("Test news"));
        assert_eq!(stored.summary_zh.as_deref(), Some("测试摘要内容"));
        assert_eq!(stored.summary_en.as_deref(), Some("Test news"));
        assert!(stored.content.is_none());
    }

    #[tokio::test]
    async fn test_second_cycle_skips_known_urls() {
        let articles = vec![
            article(1, "Flood warning in Chiang Mai", Some("Heavy rain expected")),
            article(2, "Bangkok traffic update", None),
        ];
        let (scheduler, _, _) = scheduler(articles, Some("Full article body text"), responder());

        let first = scheduler.run_cycle().await.unwrap();
        assert_eq!(first.success, 2);

        let second = scheduler.run_cycle().await.unwrap();
        assert_eq!(second, CycleReport { processed: 2, success: 0, skipped: 2, error: 0 });
    }

    #[tokio::test]
    async fn test_body_fetch_failure_does_not_fail_item() {
        let (scheduler, news, _) = scheduler(
            vec![article(1, "Exchange rate news", Some("Baht gains"))],
            None,
            responder(),
        );

        let report = scheduler.run_cycle().await.unwrap();
        assert_eq!(report.success, 1);
        assert_eq!(news.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failing_generator_still_saves_items() {
        let (scheduler, news, _) = scheduler(
            vec![article(1, "ข่าวทดสอบ", Some("รายละเอียดข่าว"))],
            None,
            Arc::new(MockTextGenerator::failing()),
        );

        let report = scheduler.run_cycle().await.unwrap();
        assert_eq!(report.success, 1);

        let stored = news.find_all(Page::first(10)).unwrap();
        assert_eq!(stored[0].summary.as_deref(), Some("รายละเอียดข่าว"));
        assert!(stored[0].title_zh.is_none());
        assert!(stored[0].title_en.is_none());
    }

    #[tokio::test]
    async fn test_cycle_converts_saved_news() {
        let (scheduler, _, posts) = scheduler(
            vec![article(1, "ข่าวทดสอบ", None)],
            Some("เนื้อหาข่าวฉบับเต็ม"),
            responder(),
        );

        scheduler.run_cycle().await.unwrap();

        let converted = posts.find_by_title("ข่าวทดสอบ").unwrap();
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].title_zh.as_deref(), Some("测试新闻"));
    }

    #[tokio::test]
    async fn test_empty_fetch_reports_nothing() {
        let (scheduler, _, _) = scheduler(Vec::new(), None, responder());
        let report = scheduler.run_cycle().await.unwrap();
        assert_eq!(report, CycleReport::default());
    }
}
