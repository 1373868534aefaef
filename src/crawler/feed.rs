//! RSS / Atom feed parsing into raw articles

use chrono::Utc;
use feed_rs::model::Entry;
use url::Url;

use super::url::resolve_canonical;
use super::RawArticle;
use crate::utils::error::ParseError;
use crate::utils::{is_blank, strip_html_tags, truncate_chars};

/// Feed descriptions are capped at this many characters
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Parse a feed document into at most `max_items` articles
///
/// Entries without a title or a usable link are skipped. An empty result is a
/// [`ParseError::EmptyFeed`] so the caller can fall back to the HTML listing.
pub fn parse_feed(
    bytes: &[u8],
    source: &str,
    feed_url: &Url,
    max_items: usize,
) -> Result<Vec<RawArticle>, ParseError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| ParseError::InvalidFeed(e.to_string()))?;

    let articles: Vec<RawArticle> = feed
        .entries
        .iter()
        .filter_map(|entry| entry_to_article(entry, source, feed_url))
        .take(max_items)
        .collect();

    if articles.is_empty() {
        return Err(ParseError::EmptyFeed);
    }

    tracing::debug!(source, count = articles.len(), "Parsed feed entries");
    Ok(articles)
}

fn entry_to_article(entry: &Entry, source: &str, feed_url: &Url) -> Option<RawArticle> {
    let title = entry
        .title
        .as_ref()
        .map(|t| strip_html_tags(&t.content))
        .filter(|t| !is_blank(t))?;

    let link = entry.links.first().map(|l| l.href.as_str())?;
    let url = resolve_canonical(feed_url, link)?;

    let description = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .map(|raw| strip_html_tags(&raw))
        .filter(|d| !is_blank(d));
    let summary = match description {
        Some(d) => truncate_chars(&d, DESCRIPTION_MAX_CHARS),
        None => title.clone(),
    };

    let published_at = entry.published.or(entry.updated).unwrap_or_else(Utc::now);

    Some(RawArticle {
        title,
        summary: Some(summary),
        content: None,
        url,
        image_url: first_image(entry),
        published_at,
        source: source.to_string(),
    })
}

fn first_image(entry: &Entry) -> Option<String> {
    entry.media.iter().find_map(|media| {
        media
            .content
            .iter()
            .find(|c| {
                c.content_type
                    .as_ref()
                    .map_or(true, |m| m.essence_str().starts_with("image/"))
            })
            .and_then(|c| c.url.as_ref().map(|u| u.to_string()))
            .or_else(|| media.thumbnails.first().map(|t| t.image.uri.clone()))
    })
}
