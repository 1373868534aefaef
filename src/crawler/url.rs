//! Canonical URLs and article-link heuristics
//!
//! The canonical URL is the deduplication key of a news item, so two links to the
//! same article must normalize to the same string:
//! - relative links are resolved against the origin
//! - scheme and host are lowercased
//! - fragments and tracking parameters (`utm_*`, `fbclid`, `gclid`, `ref`) are dropped
//! - a trailing slash is dropped, except on the root path
//! - remaining query parameters are sorted

use url::Url;

/// Path fragments that mark navigation rather than articles
const NAVIGATION_SEGMENTS: &[&str] = &["/category/", "/tag/", "/author/", "/page/", "/search"];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || matches!(key.as_str(), "fbclid" | "gclid" | "ref")
}

/// Normalize an absolute URL
pub fn canonical_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    normalize(url)
}

/// Resolve `href` against `base`, then normalize
pub fn resolve_canonical(base: &Url, href: &str) -> Option<String> {
    let url = base.join(href.trim()).ok()?;
    normalize(url)
}

fn normalize(mut url: Url) -> Option<String> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str()?;

    url.set_fragment(None);

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();
    if params.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(params);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Some(url.to_string())
}

fn bare_host(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.to_ascii_lowercase().trim_start_matches("www.").to_string())
}

/// URL-shape rule for candidate article links on a listing page
///
/// `href` is the raw attribute value; `resolved` is its canonical form.
pub fn is_article_link(href: &str, resolved: &str, origin: &Url) -> bool {
    let href = href.trim();
    let lowered = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
    {
        return false;
    }

    let Ok(url) = Url::parse(resolved) else {
        return false;
    };
    if bare_host(&url) != bare_host(origin) {
        return false;
    }

    let path = url.path().to_ascii_lowercase();
    if NAVIGATION_SEGMENTS.iter().any(|seg| path.contains(seg)) {
        return false;
    }

    path.chars().any(|c| c.is_ascii_digit()) || path.contains("/news/") || path.contains("/article/")
}

/// Readable title guess from the last path segment
pub fn title_from_path(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url
        .path_segments()?
        .rev()
        .find(|s| !s.is_empty())?
        .trim_end_matches(".html")
        .trim_end_matches(".htm");

    let decoded = percent_decode(segment);
    let title = decoded.replace('-', " ");
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Path-segment decoding: `+` and `=` stay literal
fn percent_decode(segment: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}
