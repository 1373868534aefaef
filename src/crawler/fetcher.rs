//! HTTP fetcher with rate limiting and Thai charset support
//!
//! One `PageFetcher` is shared by every news origin:
//! - User-Agent rotation
//! - Rate limiting with governor
//! - Automatic retry with exponential backoff
//! - Charset detection (Content-Type, then `<meta charset>`), UTF-8 by default
//!   and TIS-620 / windows-874 as the fallback for legacy Thai pages

use crate::utils::error::FetchError;
use encoding_rs::{Encoding, UTF_8, WINDOWS_874};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use rand::seq::SliceRandom;
use regex::bytes::Regex;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT},
    Client,
};
use std::num::NonZeroU32;
use std::sync::LazyLock;
use std::time::Duration;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default retry budget per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([A-Za-z0-9_\-]+)"#).expect("valid regex")
});

/// Raw HTTP body plus the declared content type
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Shared HTTP fetcher for feeds, listing pages and article pages
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,

    /// Maximum number of retry attempts for failed requests
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,
}

impl PageFetcher {
    /// Create a new fetcher with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(requests_per_second: u32) -> Result<Self, FetchError> {
        Self::with_config(requests_per_second, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT)
    }

    /// Create a new fetcher with custom configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        requests_per_second: u32,
        max_retries: u32,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
            max_retries,
            base_delay_ms: 1000,
        })
    }

    /// Override the backoff base delay
    #[must_use]
    pub fn with_base_delay(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Fetch a page and decode it to text
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let body = self.fetch_bytes(url).await?;
        decode_bytes(&body.bytes, &body.content_type)
    }

    /// Fetch raw bytes; feed parsing handles its own encoding
    ///
    /// # Errors
    ///
    /// Returns various `FetchError` variants depending on the failure mode
    pub async fn fetch_bytes(&self, url: &str) -> Result<FetchedBody, FetchError> {
        url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        self.rate_limiter.until_ready().await;
        self.fetch_with_retry(url).await
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tracing::debug!(url, attempt, delay_ms = delay, "Retrying fetch");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.client.get(url).headers(self.build_headers()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let content_type = response
                            .headers()
                            .get(CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string)
                            .unwrap_or_default();
                        let bytes = response.bytes().await?.to_vec();
                        return Ok(FetchedBody {
                            bytes,
                            content_type,
                        });
                    } else if Self::should_retry(status.as_u16()) {
                        last_error = Some(if status.as_u16() == 429 {
                            FetchError::RateLimit
                        } else {
                            FetchError::ServerError(status.as_u16())
                        });
                    } else {
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) if e.is_timeout() => last_error = Some(FetchError::Timeout),
                Err(e) => last_error = Some(FetchError::Http(e)),
            }
        }

        if let Some(err) = last_error {
            tracing::warn!(url, error = %err, retries = self.max_retries, "Giving up on fetch");
        }
        Err(FetchError::MaxRetriesExceeded)
    }

    /// Retry on 429 and transient 5xx; never on other 4xx
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/rss+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("th-TH,th;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        headers
    }

    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).copied().unwrap_or(USER_AGENTS[0])
    }
}

/// Decode bytes to a string
///
/// Order: charset from Content-Type, `<meta charset>` in the first 2 KiB,
/// strict UTF-8, then windows-874.
///
/// # Errors
///
/// Returns `FetchError::Decode` if no candidate decodes cleanly
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    if let Some(encoding) = declared_encoding(bytes, content_type) {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return Ok(text.into_owned());
        }
        tracing::debug!(charset = encoding.name(), "Declared charset failed, sniffing");
    }

    let (text, _, had_errors) = UTF_8.decode(bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }

    let (text, _, had_errors) = WINDOWS_874.decode(bytes);
    if !had_errors {
        return Ok(text.into_owned());
    }

    Err(FetchError::Decode(
        "Failed to decode content with UTF-8 or windows-874".to_string(),
    ))
}

fn declared_encoding(bytes: &[u8], content_type: &str) -> Option<&'static Encoding> {
    let from_header = content_type
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset="))
        .find_map(|label| Encoding::for_label(label.trim_matches('"').as_bytes()));
    if from_header.is_some() {
        return from_header;
    }

    let head = &bytes[..bytes.len().min(2048)];
    META_CHARSET
        .captures(head)
        .and_then(|caps| caps.get(1))
        .and_then(|label| Encoding::for_label(label.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// "สวัสดี" in TIS-620
    const TIS620_HELLO: &[u8] = &[0xca, 0xc7, 0xd1, 0xca, 0xb4, 0xd5];

    #[test]
    fn test_user_agent_rotation() {
        let fetcher = PageFetcher::new(10).unwrap();

        let mut agents = std::collections::HashSet::new();
        for _ in 0..100 {
            let agent = fetcher.random_user_agent();
            assert!(USER_AGENTS.contains(&agent));
            agents.insert(agent);
        }

        assert!(agents.len() > 1, "User agents should rotate");
    }

    #[test]
    fn test_decode_utf8() {
        let text = "ข่าวล่าสุด Breaking 新闻";
        let decoded = decode_bytes(text.as_bytes(), "text/html; charset=utf-8").unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_decode_tis620_declared() {
        let decoded = decode_bytes(TIS620_HELLO, "text/html; charset=TIS-620").unwrap();
        assert_eq!(decoded, "สวัสดี");
    }

    #[test]
    fn test_decode_tis620_fallback() {
        let decoded = decode_bytes(TIS620_HELLO, "text/html").unwrap();
        assert_eq!(decoded, "สวัสดี");
    }

    #[test]
    fn test_decode_meta_charset() {
        let mut page = b"<html><head><meta charset=\"windows-874\"></head><body>".to_vec();
        page.extend_from_slice(TIS620_HELLO);
        let decoded = decode_bytes(&page, "").unwrap();
        assert!(decoded.ends_with("สวัสดี"));
    }

    #[test]
    fn test_headers() {
        let fetcher = PageFetcher::new(10).unwrap();
        let headers = fetcher.build_headers();

        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers
            .get(ACCEPT_LANGUAGE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("th-TH"));
    }

    #[test]
    fn test_should_retry() {
        for status in [429, 500, 502, 503, 504] {
            assert!(PageFetcher::should_retry(status));
        }
        for status in [200, 400, 401, 403, 404] {
            assert!(!PageFetcher::should_retry(status));
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_request() {
        let fetcher = PageFetcher::new(10).unwrap();
        let err = fetcher.fetch_text("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
