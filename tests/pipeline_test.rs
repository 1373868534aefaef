//! End-to-end pipeline tests
//!
//! A mock feed server, a scripted text generator and a SQLite file in a temp
//! directory stand in for the outside world.

mod common;

use std::sync::Arc;

use newsbridge::converter::{NewsToPostConverter, NEWS_CATEGORY};
use newsbridge::crawler::{NewsSource, SourceConfig};
use newsbridge::language::LanguageClassifier;
use newsbridge::llm::MockTextGenerator;
use newsbridge::models::{Language, PostStatus};
use newsbridge::moderation::{Blocklist, ModerationEngine};
use newsbridge::posts::PostService;
use newsbridge::reader::LocalizedView;
use newsbridge::scheduler::PipelineScheduler;
use newsbridge::storage::{
    create_sqlite_repositories, Page, SharedNewsRepository, SharedPostRepository,
};
use newsbridge::summary::Summarizer;
use newsbridge::translation::TranslationOrchestrator;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    _dir: TempDir,
    scheduler: PipelineScheduler,
    news: SharedNewsRepository,
    posts: SharedPostRepository,
}

async fn feed_server() -> MockServer {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::thai_rss(&base)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::ARTICLE_HTML))
        .mount(&server)
        .await;

    server
}

fn harness(server: &MockServer, generator: Arc<MockTextGenerator>) -> Harness {
    let dir = TempDir::new().unwrap();
    let (news, posts) = create_sqlite_repositories(dir.path().join("pipeline.db")).unwrap();

    let classifier = Arc::new(LanguageClassifier::default());
    let translator = TranslationOrchestrator::new(generator.clone(), classifier.clone());
    let converter = NewsToPostConverter::new(news.clone(), posts.clone(), translator.clone());
    let source = NewsSource::new(
        common::fast_fetcher(),
        vec![SourceConfig::new(
            "Thai Daily",
            Some(&format!("{}/rss", server.uri())),
            None,
        )],
    );

    let scheduler = PipelineScheduler::new(
        Arc::new(source),
        news.clone(),
        Summarizer::new(generator),
        translator,
        converter,
        classifier,
    )
    .with_conversion_limit(10);

    Harness {
        _dir: dir,
        scheduler,
        news,
        posts,
    }
}

#[tokio::test]
async fn test_thai_item_end_to_end() {
    let server = feed_server().await;
    let h = harness(&server, common::scripted_generator());

    let report = h.scheduler.run_cycle().await.unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.success, 2);
    assert_eq!(report.error, 0);

    let item = h
        .news
        .find_by_canonical_url(&format!("{}/news/1", server.uri()))
        .unwrap()
        .expect("item stored");
    assert_eq!(item.title, "ข่าวทดสอบ");
    assert_eq!(item.original_language, Language::Th);
    assert!(item.content.is_none());
    assert_eq!(item.title_zh.as_deref(), Some("测试新闻"));
    assert_eq!(item.title_en.as_deref(), Some("Test news"));

    // Unsupported selector never surfaces the Thai original
    let view = LocalizedView::for_news(&item, Language::Th);
    assert_ne!(view.title, "ข่าวทดสอบ");
    assert!(view.title == "测试新闻" || view.title == "Test news");

    let with_body = h
        .news
        .find_by_canonical_url(&format!("{}/news/2", server.uri()))
        .unwrap()
        .unwrap();
    assert!(with_body
        .content
        .as_deref()
        .unwrap()
        .contains("two hundred study seats"));
}

#[tokio::test]
async fn test_cycle_converts_news_to_approved_posts() {
    let server = feed_server().await;
    let h = harness(&server, common::scripted_generator());

    h.scheduler.run_cycle().await.unwrap();

    let approved = h.posts.find_by_status(PostStatus::Approved, Page::first(10)).unwrap();
    assert_eq!(approved.len(), 2);
    for post in &approved {
        assert_eq!(post.author, "system");
        assert_eq!(post.category, NEWS_CATEGORY);
        assert!(post.tags.contains(&"Thai Daily".to_string()));
        assert_eq!(post.title_zh.as_deref(), Some("测试新闻"));
    }
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = feed_server().await;
    let h = harness(&server, common::scripted_generator());

    h.scheduler.run_cycle().await.unwrap();
    let second = h.scheduler.run_cycle().await.unwrap();

    assert_eq!(second.processed, 2);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.success, 0);
    assert_eq!(h.news.count().unwrap(), 2);
    assert_eq!(h.posts.count_by_status(PostStatus::Approved).unwrap(), 2);
}

#[tokio::test]
async fn test_generator_outage_degrades_gracefully() {
    let server = feed_server().await;
    let h = harness(&server, Arc::new(MockTextGenerator::failing()));

    let report = h.scheduler.run_cycle().await.unwrap();
    assert_eq!(report.success, 2);

    let item = h
        .news
        .find_by_canonical_url(&format!("{}/news/1", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(item.summary.as_deref(), Some("ข่าวทดสอบ"));
    assert!(item.title_zh.is_none());
    assert!(item.title_en.is_none());

    let view = LocalizedView::for_news(&item, Language::Zh);
    assert_eq!(view.title, newsbridge::reader::ZH_TITLE_PLACEHOLDER);
}

#[tokio::test]
async fn test_user_post_flow() {
    let dir = TempDir::new().unwrap();
    let (_, posts) = create_sqlite_repositories(dir.path().join("posts.db")).unwrap();
    let generator = common::scripted_generator();
    let classifier = Arc::new(LanguageClassifier::default());
    let service = PostService::new(
        posts.clone(),
        TranslationOrchestrator::new(generator.clone(), classifier.clone()),
        ModerationEngine::new(generator.clone(), Arc::new(Blocklist::default())),
        classifier,
    );

    let post = service
        .submit("alice", "หาห้องพักใกล้มหาวิทยาลัย", "ต้องการห้องพักราคาไม่แพง")
        .await
        .unwrap();
    assert_eq!(post.status, PostStatus::Approved);
    assert_eq!(post.original_language, Language::Th);
    assert_eq!(post.title_zh.as_deref(), Some("测试新闻"));

    let calls_before = generator.calls();
    let blocked = service
        .submit("mallory", "Cheap drugs here", "Message me")
        .await
        .unwrap();
    assert_eq!(blocked.status, PostStatus::Rejected);
    // Translations still run; moderation makes no call on a blocklist hit
    let translation_calls = generator.calls() - calls_before;
    assert!(translation_calls <= 4);

    let stored = service.get(&post.id).unwrap();
    assert_eq!(stored.title, post.title);
    assert_eq!(stored.status, PostStatus::Approved);
    assert_eq!(stored.title_en.as_deref(), Some("Test news"));
    assert_eq!(service.count_by_status(PostStatus::Rejected).unwrap(), 1);
    assert_eq!(service.cleanup(PostStatus::Rejected).unwrap(), 1);
    assert_eq!(service.count_by_status(PostStatus::Rejected).unwrap(), 0);
}
