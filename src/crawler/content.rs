//! Article body extraction from detail pages
//!
//! Tries an ordered list of container selectors and keeps the first one whose
//! visible text is substantial. Text inside scripts, styles, navigation, page
//! chrome and ad slots is never collected.

use scraper::{ElementRef, Html, Node, Selector};
use std::sync::LazyLock;

use crate::utils::normalize_whitespace;

/// Minimum characters for a candidate to count as the article body
pub const MIN_BODY_CHARS: usize = 100;

macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

static BODY_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        parse_selector!("article .article-body"),
        parse_selector!("article .story-body"),
        parse_selector!(".article-content"),
        parse_selector!(".story-content"),
        parse_selector!(".article-body"),
        parse_selector!(".story-body"),
        parse_selector!("article"),
        parse_selector!(".content"),
        parse_selector!("main article"),
        parse_selector!("[class*='article']"),
        parse_selector!("[class*='story']"),
    ]
});

static BODY: LazyLock<Selector> = LazyLock::new(|| parse_selector!("body"));

const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "iframe", "form",
];

fn is_ad_class(class: &str) -> bool {
    let class = class.to_ascii_lowercase();
    class == "ad"
        || class == "ads"
        || class.starts_with("ad-")
        || class.starts_with("ads-")
        || class.contains("advert")
        || class.contains("sponsor")
}

fn is_noise(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    NOISE_TAGS.contains(&value.name()) || value.classes().any(is_ad_class)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    if !is_noise(&child_el) {
                        out.push(' ');
                        collect_text(child_el, out);
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

/// Visible text of an element, whitespace-normalized
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalize_whitespace(&raw)
}

/// Extract the main article text from a detail page
pub fn extract_body(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector in BODY_SELECTORS.iter() {
        for element in document.select(selector) {
            if is_noise(&element) {
                continue;
            }
            let text = visible_text(element);
            if text.chars().count() > MIN_BODY_CHARS {
                return Some(text);
            }
        }
    }

    let body = document.select(&BODY).next()?;
    let text = visible_text(body);
    (text.chars().count() > MIN_BODY_CHARS).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(word: &str) -> String {
        std::iter::repeat(word).take(40).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_prefers_article_body() {
        let html = format!(
            r#"<html><body>
                <nav>Home News Sport</nav>
                <article><h1>Headline</h1>
                  <div class="article-body"><p>{}</p>
                    <script>var tracking = 1;</script>
                    <div class="ad-slot">Buy now</div>
                  </div>
                </article>
              </body></html>"#,
            long_text("ฝนตกหนัก")
        );

        let body = extract_body(&html).unwrap();
        assert!(body.starts_with("ฝนตกหนัก"));
        assert!(!body.contains("tracking"));
        assert!(!body.contains("Buy now"));
        assert!(!body.contains("Headline"));
    }

    #[test]
    fn test_skips_short_candidates() {
        let html = format!(
            r#"<html><body>
                <div class="article-content">Too short</div>
                <div class="story-content"><p>{}</p></div>
              </body></html>"#,
            long_text("flood")
        );

        let body = extract_body(&html).unwrap();
        assert!(body.starts_with("flood flood"));
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = format!(
            r#"<html><body><header>Site</header><div><p>{}</p></div><footer>Copyright</footer></body></html>"#,
            long_text("rain")
        );

        let body = extract_body(&html).unwrap();
        assert!(body.starts_with("rain"));
        assert!(!body.contains("Site"));
        assert!(!body.contains("Copyright"));
    }

    #[test]
    fn test_nothing_substantial() {
        assert!(extract_body("<html><body><p>tiny</p></body></html>").is_none());
        assert!(extract_body("").is_none());
    }
}
