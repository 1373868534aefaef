//! Unified error handling for the newsbridge crate
//!
//! Domain errors (fetching, parsing, text generation, scheduling, post review)
//! convert into a single [`Error`] enum. Every error carries an
//! [`ErrorCategory`] that decides how the pipeline reacts:
//!
//! - `Configuration` is fatal and surfaces at startup
//! - `ExternalService` and `Parse` degrade to "nothing produced" for one field or item
//! - `Duplicate` is expected and skipped without being logged as an error
//!
//! # Usage
//!
//! ```rust,ignore
//! use newsbridge::error::{Error, ErrorCategory, PipelineErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     match err.category() {
//!         ErrorCategory::Duplicate => tracing::debug!("skipped"),
//!         _ if err.is_recoverable() => tracing::warn!(error = %err, "retry next cycle"),
//!         _ => tracing::error!(error = %err, "fatal"),
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::llm::LlmError;
pub use crate::posts::PostError;
pub use crate::scheduler::error::SchedulerError;
pub use crate::utils::error::{FetchError, ParseError};

/// Common trait for all newsbridge error types
pub trait PipelineErrorTrait: std::error::Error {
    /// Check if this error is recoverable (a later cycle may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing credentials or invalid settings
    Configuration,
    /// Timeout, 4xx or 5xx from the text generation service
    ExternalService,
    /// Malformed feed, page or structured response
    Parse,
    /// Canonical URL or title collision
    Duplicate,
    /// Fetching news sources
    Network,
    /// Storage and I/O errors
    Storage,
    /// Scheduler and timing errors
    Scheduler,
    /// Invalid state transitions and other errors
    Other,
}

impl ErrorCategory {
    /// Short label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::ExternalService => "external_service",
            Self::Parse => "parse",
            Self::Duplicate => "duplicate",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Scheduler => "scheduler",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the newsbridge crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-specific errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Parse-specific errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Text generation service errors
    #[error("Text generation error: {0}")]
    Llm(#[from] LlmError),

    /// Scheduler and timing errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Post lifecycle errors
    #[error("Post error: {0}")]
    Post(#[from] PostError),

    /// Item already stored under the same key
    #[error("Duplicate {kind}: {key}")]
    Duplicate { kind: &'static str, key: String },

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PipelineErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Parse(_) => true,
            Self::Llm(e) => e.is_recoverable(),
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Post(_) => false,
            Self::Duplicate { .. } => true,
            Self::Database(_) => false,
            Self::Io(_) => true,
            Self::Json(_) => false,
            Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Parse(_) | Self::Json(_) => ErrorCategory::Parse,
            Self::Llm(LlmError::MissingApiKey) => ErrorCategory::Configuration,
            Self::Llm(_) => ErrorCategory::ExternalService,
            Self::Scheduler(_) => ErrorCategory::Scheduler,
            Self::Post(_) => ErrorCategory::Other,
            Self::Duplicate { .. } => ErrorCategory::Duplicate,
            Self::Database(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a duplicate-key error
    pub fn duplicate(kind: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            key: key.into(),
        }
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// True for expected collisions that callers skip silently
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, ref msg) = err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                return Self::Duplicate {
                    kind: "row",
                    key: msg.clone().unwrap_or_default(),
                };
            }
        }
        Self::Database(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        let fetch_err = Error::Fetch(FetchError::Timeout);
        assert_eq!(fetch_err.category(), ErrorCategory::Network);

        let parse_err = Error::Parse(ParseError::EmptyFeed);
        assert_eq!(parse_err.category(), ErrorCategory::Parse);

        let llm_err = Error::Llm(LlmError::Status {
            status: 503,
            body: String::new(),
        });
        assert_eq!(llm_err.category(), ErrorCategory::ExternalService);
    }

    #[test]
    fn test_missing_api_key_is_configuration() {
        let err: Error = LlmError::MissingApiKey.into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_is_recoverable() {
        let fetch_err = Error::Fetch(FetchError::Timeout);
        assert!(fetch_err.is_recoverable());

        let not_found = Error::Fetch(FetchError::ServerError(404));
        assert!(!not_found.is_recoverable());

        let config_err = Error::config("missing key");
        assert!(!config_err.is_recoverable());
    }

    #[test]
    fn test_duplicate_error() {
        let err = Error::duplicate("news", "https://example.com/news/1");
        assert!(err.is_duplicate());
        assert_eq!(err.category(), ErrorCategory::Duplicate);
        assert!(err.to_string().contains("https://example.com/news/1"));
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: Error = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_other_error() {
        let err = Error::other("Something went wrong");
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(ErrorCategory::Other.as_str(), "other");
    }
}
