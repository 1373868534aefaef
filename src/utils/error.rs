//! Error types for fetching and parsing news sources

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts exceeded")]
    MaxRetriesExceeded,

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Transient failures that a later attempt may get past
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::RateLimit | Self::Timeout | Self::MaxRetriesExceeded
        ) || matches!(self, Self::ServerError(code) if *code >= 500)
    }
}

/// Errors that can occur while parsing feeds and pages
#[derive(Error, Debug)]
pub enum ParseError {
    /// Feed document could not be parsed as RSS or Atom
    #[error("Invalid feed: {0}")]
    InvalidFeed(String),

    /// Feed parsed but yielded no usable entries
    #[error("Feed contains no entries")]
    EmptyFeed,

    /// Page contained no candidate article links
    #[error("No article links found")]
    NoArticleLinks,

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
