//! Listing-page fallback for origins whose feed is empty or broken
//!
//! Candidate links come from a fixed set of card/heading selectors. Each link
//! must pass the URL-shape rule in [`super::url::is_article_link`]; the title is
//! taken from the link text, the nearest heading, a title element inside the
//! surrounding card, or finally the URL slug.

use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

use super::content::visible_text;
use super::url::{is_article_link, resolve_canonical, title_from_path};
use super::RawArticle;
use crate::utils::truncate_chars;

/// Titles shorter than this are navigation noise
pub const MIN_TITLE_CHARS: usize = 3;

const CARD_SUMMARY_MAX_CHARS: usize = 500;

macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

static LINK_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        parse_selector!("article a[href]"),
        parse_selector!(".story a[href]"),
        parse_selector!(".article-item a[href]"),
        parse_selector!("h2 a[href]"),
        parse_selector!("h3 a[href]"),
    ]
});

static CARD_TITLE: LazyLock<Selector> = LazyLock::new(|| parse_selector!(".title, .headline"));

static CARD_SUMMARY: LazyLock<Selector> =
    LazyLock::new(|| parse_selector!(".summary, .lead, .description, .snippet, p"));

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4"];

fn is_card(element: &ElementRef<'_>) -> bool {
    let value = element.value();
    value.name() == "article" || value.classes().any(|c| c == "story" || c == "article-item")
}

fn ancestors(link: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    link.ancestors().filter_map(ElementRef::wrap)
}

/// Surrounding card of a link: nearest article-like container, else the parent
fn card_of(link: ElementRef<'_>) -> Option<ElementRef<'_>> {
    ancestors(link)
        .find(is_card)
        .or_else(|| ancestors(link).find(|el| !HEADING_TAGS.contains(&el.value().name())))
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn title_for(link: ElementRef<'_>, card: Option<ElementRef<'_>>, url: &str) -> Option<String> {
    non_empty(visible_text(link))
        .or_else(|| {
            ancestors(link)
                .find(|el| HEADING_TAGS.contains(&el.value().name()))
                .and_then(|h| non_empty(visible_text(h)))
        })
        .or_else(|| {
            card.and_then(|c| c.select(&CARD_TITLE).next())
                .and_then(|t| non_empty(visible_text(t)))
        })
        .or_else(|| title_from_path(url))
        .filter(|t| t.chars().count() >= MIN_TITLE_CHARS)
}

fn summary_for(card: Option<ElementRef<'_>>, title: &str) -> Option<String> {
    card?
        .select(&CARD_SUMMARY)
        .map(visible_text)
        .find(|text| !text.is_empty() && text != title)
        .map(|text| truncate_chars(&text, CARD_SUMMARY_MAX_CHARS))
}

/// Extract up to `max_items` article candidates from a listing page
pub fn extract_listing(html: &str, origin: &Url, source: &str, max_items: usize) -> Vec<RawArticle> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut articles = Vec::new();

    for selector in LINK_SELECTORS.iter() {
        for link in document.select(selector) {
            if articles.len() >= max_items {
                return articles;
            }

            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_canonical(origin, href) else {
                continue;
            };
            if !is_article_link(href, &url, origin) || seen.contains(&url) {
                continue;
            }

            let card = card_of(link);
            let Some(title) = title_for(link, card, &url) else {
                tracing::debug!(url = %url, "Dropping link without usable title");
                continue;
            };

            seen.insert(url.clone());
            articles.push(RawArticle {
                summary: summary_for(card, &title),
                title,
                content: None,
                url,
                image_url: None,
                published_at: Utc::now(),
                source: source.to_string(),
            });
        }
    }

    articles
}
