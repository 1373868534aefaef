//! newsbridge - Multilingual news and community content pipeline
//!
//! Fetches Thai news, summarizes and translates it into Chinese and English,
//! turns it into community posts, and moderates user submissions.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Feed and listing fetchers with rate limiting
//! - [`language`] - Script-based language detection
//! - [`llm`] - Text generation client
//! - [`summary`] - AI summaries of news items
//! - [`translation`] - Format-preserving zh/en translation
//! - [`moderation`] - Blocklist and classifier moderation
//! - [`converter`] - News to community post conversion
//! - [`scheduler`] - Daily and manual pipeline cycles
//! - [`posts`] - Submission, review and admin flows
//! - [`reader`] - Read-time language fallback
//! - [`storage`] - News and post repositories (SQLite, in-memory)
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use newsbridge::config::Config;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(None)?;
//!     config.require_credentials()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod converter;
pub mod crawler;
pub mod error;
pub mod language;
pub mod llm;
pub mod metrics;
pub mod models;
pub mod moderation;
pub mod posts;
pub mod reader;
pub mod scheduler;
pub mod storage;
pub mod summary;
pub mod translation;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::converter::NewsToPostConverter;
    pub use crate::crawler::{ArticleSource, NewsSource, RawArticle};
    pub use crate::error::{Error, ErrorCategory, PipelineErrorTrait, Result};
    pub use crate::language::LanguageClassifier;
    pub use crate::llm::{LlmClient, TextGenerator};
    pub use crate::models::{CycleReport, Language, News, Post, PostStatus};
    pub use crate::moderation::ModerationEngine;
    pub use crate::posts::PostService;
    pub use crate::reader::LocalizedView;
    pub use crate::scheduler::{DailyTrigger, PipelineScheduler};
    pub use crate::storage::{NewsRepository, PostRepository};
    pub use crate::translation::TranslationOrchestrator;
}

// Direct re-exports for convenience
pub use models::{Language, News, Post, PostStatus};
