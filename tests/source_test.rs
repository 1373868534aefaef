//! Integration tests for NewsSource feed and listing fallback

mod common;

use newsbridge::crawler::{ArticleSource, NewsSource, SourceConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(name: &str, feed: Option<String>, site: Option<String>) -> SourceConfig {
    SourceConfig::new(name, feed.as_deref(), site.as_deref())
}

#[tokio::test]
async fn test_feed_items_are_canonical() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml; charset=utf-8")
                .set_body_string(common::thai_rss(&base)),
        )
        .mount(&server)
        .await;

    let news = NewsSource::new(
        common::fast_fetcher(),
        vec![source("Thai Daily", Some(format!("{base}/rss")), None)],
    );

    let articles = news.fetch_articles().await;
    assert_eq!(articles.len(), 2);

    assert_eq!(articles[0].title, "ข่าวทดสอบ");
    assert_eq!(articles[0].url, format!("{base}/news/1"));
    assert_eq!(articles[0].summary.as_deref(), Some("ข่าวทดสอบ"));
    assert_eq!(articles[0].source, "Thai Daily");

    assert_eq!(
        articles[1].summary.as_deref(),
        Some("จำนวนนักศึกษาต่างชาติในเชียงใหม่เพิ่มขึ้น")
    );
}

#[tokio::test]
async fn test_broken_feed_falls_back_to_listing() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/campus"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::listing_html(&base)))
        .mount(&server)
        .await;

    let news = NewsSource::new(
        common::fast_fetcher(),
        vec![source(
            "Campus",
            Some(format!("{base}/rss")),
            Some(format!("{base}/campus")),
        )],
    );

    let articles = news.fetch_articles().await;
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0].title, "Campus library opens new wing");
    assert_eq!(articles[0].url, format!("{base}/news/2024/campus-library-opens"));
    assert_eq!(
        articles[0].summary.as_deref(),
        Some("The new wing adds study rooms for international students.")
    );
    assert_eq!(articles[1].title, "Visa office extends hours");
}

#[tokio::test]
async fn test_failing_source_does_not_block_others() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::thai_rss(&base)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>nothing</body></html>"))
        .mount(&server)
        .await;

    let news = NewsSource::new(
        common::fast_fetcher(),
        vec![
            source("Broken", None, Some(format!("{base}/broken"))),
            source("Thai Daily", Some(format!("{base}/rss")), None),
            source("Mirror", Some(format!("{base}/rss")), None),
        ],
    );

    let articles = news.fetch_articles().await;
    // Mirror repeats the same URLs and is deduplicated
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.source == "Thai Daily"));
}

#[tokio::test]
async fn test_fetch_body_extracts_article_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/2024/campus-library-opens"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::ARTICLE_HTML))
        .mount(&server)
        .await;

    let news = NewsSource::new(common::fast_fetcher(), Vec::new());
    let body = news
        .fetch_body(&format!("{}/news/2024/campus-library-opens", server.uri()))
        .await
        .unwrap()
        .unwrap();

    assert!(body.starts_with("The university library opened a new wing"));
    assert!(body.contains("exam preparation"));
    assert!(!body.contains("Buy now"));
    assert!(!body.contains("Menu"));
}
