//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use newsbridge::crawler::fetcher::PageFetcher;
use newsbridge::llm::MockTextGenerator;

/// Thai RSS feed whose links point at `base`; the first item has no description
pub fn thai_rss(base: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>ข่าวไทย</title>
    <link>{base}/</link>
    <description>ข่าวล่าสุด</description>
    <item>
      <title>ข่าวทดสอบ</title>
      <link>{base}/news/1?utm_source=rss</link>
      <pubDate>Mon, 15 Jan 2024 08:00:00 +0700</pubDate>
    </item>
    <item>
      <title>นักศึกษาต่างชาติเพิ่มขึ้น</title>
      <link>{base}/news/2</link>
      <description>&lt;p&gt;จำนวนนักศึกษาต่างชาติในเชียงใหม่เพิ่มขึ้น&lt;/p&gt;</description>
      <pubDate>Mon, 15 Jan 2024 09:00:00 +0700</pubDate>
    </item>
  </channel>
</rss>"#
    )
}

/// Listing page with two article cards and some navigation noise
pub fn listing_html(base: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Campus News</title></head>
<body>
  <nav><a href="{base}/">Home</a> <a href="{base}/about">About</a></nav>
  <div class="news-list">
    <article class="news-item">
      <h3><a href="{base}/news/2024/campus-library-opens">Campus library opens new wing</a></h3>
      <p class="excerpt">The new wing adds study rooms for international students.</p>
    </article>
    <article class="news-item">
      <h3><a href="{base}/news/2024/visa-office-hours">Visa office extends hours</a></h3>
      <p class="excerpt">Students can now visit the visa office on Saturdays.</p>
    </article>
  </div>
</body>
</html>"#
    )
}

/// Article page with a body long enough to be extracted
pub const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Article</title></head>
<body>
  <header><nav>Menu</nav></header>
  <article>
    <h1>Campus library opens new wing</h1>
    <div class="article-content">
      <p>The university library opened a new wing on Monday with two hundred study seats.</p>
      <p>International students said the quiet rooms make exam preparation much easier.</p>
      <div class="advertisement">Buy now</div>
    </div>
  </article>
  <footer>Copyright</footer>
</body>
</html>"#;

/// Fetcher with short backoff for tests
pub fn fast_fetcher() -> Arc<PageFetcher> {
    Arc::new(
        PageFetcher::with_config(100, 2, std::time::Duration::from_secs(5))
            .expect("fetcher")
            .with_base_delay(10),
    )
}

/// Summaries in Chinese, translations by target language, safe moderation
pub fn scripted_generator() -> Arc<MockTextGenerator> {
    Arc::new(MockTextGenerator::new(|prompt| {
        let first_line = prompt.lines().next().unwrap_or_default();
        if prompt.starts_with("Please read") {
            Ok("测试摘要内容".to_string())
        } else if prompt.contains("content safety reviewer") {
            Ok(r#"{"is_safe": true, "reason": "ok", "confidence_score": 95}"#.to_string())
        } else if first_line.ends_with("to Chinese.") {
            Ok("测试新闻".to_string())
        } else {
            Ok("Test news".to_string())
        }
    }))
}
