//! News ingestion from configured origins
//!
//! Every origin is tried feed-first. When the feed is missing, errors or yields
//! nothing, the origin's listing page is scraped instead. A source that fails
//! both ways contributes no items; it never aborts the other sources.

pub mod content;
pub mod feed;
pub mod fetcher;
pub mod html;
pub mod url;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Error, FetchError, ParseError, Result};
use crate::metrics;
use fetcher::PageFetcher;

/// Default per-origin item cap
pub const DEFAULT_MAX_ITEMS: usize = 15;

fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}

/// One news origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display name, stored as the item's source
    pub name: String,

    /// RSS / Atom feed
    #[serde(default)]
    pub feed_url: Option<String>,

    /// Listing page used when the feed yields nothing
    #[serde(default)]
    pub site_url: Option<String>,

    /// Maximum items taken from this origin per cycle
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl SourceConfig {
    pub fn new(name: &str, feed_url: Option<&str>, site_url: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            feed_url: feed_url.map(str::to_string),
            site_url: site_url.map(str::to_string),
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// Built-in Thai news origins
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new(
            "Thai Rath",
            Some("https://www.thairath.co.th/rss/news"),
            Some("https://www.thairath.co.th/news"),
        ),
        SourceConfig::new(
            "Matichon",
            Some("https://www.matichon.co.th/feed"),
            Some("https://www.matichon.co.th/"),
        ),
        SourceConfig::new(
            "Khaosod",
            Some("https://www.khaosod.co.th/feed"),
            Some("https://www.khaosod.co.th/"),
        ),
        SourceConfig::new(
            "Post Today",
            Some("https://www.posttoday.com/rss/src/breakingnews.xml"),
            Some("https://www.posttoday.com/"),
        ),
        SourceConfig::new(
            "Bangkok Post",
            Some("https://www.bangkokpost.com/rss/data/topstories.xml"),
            Some("https://www.bangkokpost.com/"),
        ),
        SourceConfig::new(
            "The Nation",
            Some("https://www.nationthailand.com/rss"),
            Some("https://www.nationthailand.com/"),
        ),
        SourceConfig::new(
            "Prachachat",
            Some("https://www.prachachat.net/feed"),
            Some("https://www.prachachat.net/"),
        ),
    ]
}

/// Fetched article before summarization and translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    /// Canonical URL, the deduplication key
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub source: String,
}

/// Article provider consumed by the scheduler
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch candidates from every origin, unique by canonical URL
    async fn fetch_articles(&self) -> Vec<RawArticle>;

    /// Fetch and extract the body of one article page
    async fn fetch_body(&self, url: &str) -> Result<Option<String>>;
}

/// Thread-safe shared article source
pub type SharedArticleSource = Arc<dyn ArticleSource>;

/// Feed-first, listing-fallback news source
pub struct NewsSource {
    fetcher: Arc<PageFetcher>,
    sources: Vec<SourceConfig>,
}

impl NewsSource {
    pub fn new(fetcher: Arc<PageFetcher>, sources: Vec<SourceConfig>) -> Self {
        Self { fetcher, sources }
    }

    /// Configured origins
    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// Fetch one origin, falling back from feed to listing page
    pub async fn fetch_source(&self, source: &SourceConfig) -> Result<Vec<RawArticle>> {
        if let Some(feed_url) = &source.feed_url {
            match self.fetch_feed(source, feed_url).await {
                Ok(articles) => return Ok(articles),
                Err(e) => {
                    tracing::warn!(
                        source = %source.name,
                        feed = %feed_url,
                        error = %e,
                        "Feed unusable, falling back to listing page"
                    );
                }
            }
        }

        let Some(site_url) = &source.site_url else {
            return Err(Error::other(format!(
                "{}: feed yielded nothing and no listing page is configured",
                source.name
            )));
        };

        let origin = ::url::Url::parse(site_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{site_url}: {e}")))?;
        let page = self.fetcher.fetch_text(site_url).await?;
        let articles = html::extract_listing(&page, &origin, &source.name, source.max_items);
        if articles.is_empty() {
            return Err(ParseError::NoArticleLinks.into());
        }

        tracing::info!(source = %source.name, count = articles.len(), "Scraped listing page");
        Ok(articles)
    }

    async fn fetch_feed(&self, source: &SourceConfig, feed_url: &str) -> Result<Vec<RawArticle>> {
        let base = ::url::Url::parse(feed_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{feed_url}: {e}")))?;
        let body = self.fetcher.fetch_bytes(feed_url).await?;
        let articles = feed::parse_feed(&body.bytes, &source.name, &base, source.max_items)?;

        tracing::info!(source = %source.name, count = articles.len(), "Fetched feed");
        Ok(articles)
    }
}

#[async_trait]
impl ArticleSource for NewsSource {
    async fn fetch_articles(&self) -> Vec<RawArticle> {
        let mut seen = HashSet::new();
        let mut all = Vec::new();

        // Origins are fetched concurrently; the shared limiter still paces requests.
        let results = join_all(self.sources.iter().map(|s| self.fetch_source(s))).await;

        for (source, result) in self.sources.iter().zip(results) {
            match result {
                Ok(articles) => {
                    all.extend(articles.into_iter().filter(|a| seen.insert(a.url.clone())));
                }
                Err(e) => {
                    tracing::warn!(source = %source.name, error = %e, "Source yielded no items");
                    metrics::record_source_failure(&source.name);
                }
            }
        }

        tracing::info!(sources = self.sources.len(), items = all.len(), "Fetch finished");
        all
    }

    async fn fetch_body(&self, url: &str) -> Result<Option<String>> {
        let page = self.fetcher.fetch_text(url).await?;
        Ok(content::extract_body(&page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources() {
        let sources = default_sources();
        assert_eq!(sources.len(), 7);
        assert!(sources.iter().all(|s| s.max_items == DEFAULT_MAX_ITEMS));
        assert!(sources.iter().all(|s| s.feed_url.is_some() && s.site_url.is_some()));
        assert!(sources.iter().any(|s| s.name == "Bangkok Post"));
    }

    #[test]
    fn test_source_config_from_toml() {
        let source: SourceConfig = toml::from_str(
            r#"
            name = "Local"
            feed_url = "http://localhost/rss"
            "#,
        )
        .unwrap();
        assert_eq!(source.max_items, DEFAULT_MAX_ITEMS);
        assert!(source.site_url.is_none());
    }

    #[tokio::test]
    async fn test_source_without_any_url_fails() {
        let fetcher = Arc::new(PageFetcher::new(10).unwrap());
        let news = NewsSource::new(fetcher, vec![SourceConfig::new("Empty", None, None)]);

        assert!(news.fetch_source(&news.sources()[0]).await.is_err());
        assert!(news.fetch_articles().await.is_empty());
    }
}
