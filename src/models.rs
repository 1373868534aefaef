// Core data structures for the newsbridge pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Content language, as detected or as a translation target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Zh,
    En,
    Th,
    #[default]
    Unknown,
}

impl Language {
    /// Translation targets every item is rendered into
    pub const TARGETS: [Language; 2] = [Language::Zh, Language::En];

    /// Short language code
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
            Language::Th => "th",
            Language::Unknown => "unknown",
        }
    }

    /// English name used when instructing the text generator
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Zh => "Chinese",
            Language::En => "English",
            Language::Th => "Thai",
            Language::Unknown => "the original language",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh-tw" => Language::Zh,
            "en" | "en-us" | "en-gb" => Language::En,
            "th" | "th-th" => Language::Th,
            _ => Language::Unknown,
        })
    }
}

/// Stored news item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub id: String,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub source: String,
    pub canonical_url: String,
    pub image_url: Option<String>,
    pub original_language: Language,
    pub title_zh: Option<String>,
    pub title_en: Option<String>,
    pub summary_zh: Option<String>,
    pub summary_en: Option<String>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl News {
    /// Stable ID derived from the canonical URL
    pub fn id_for_url(canonical_url: &str) -> String {
        let hash = Sha256::digest(canonical_url.as_bytes());
        format!("news_{hash:x}").chars().take(37).collect()
    }
}

/// Moderation lifecycle of a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl PostStatus {
    /// Persisted representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::PendingReview => "PENDING_REVIEW",
            PostStatus::Approved => "APPROVED",
            PostStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "PENDING_REVIEW" | "PENDING" => Ok(PostStatus::PendingReview),
            "APPROVED" => Ok(PostStatus::Approved),
            "REJECTED" => Ok(PostStatus::Rejected),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// Community post, created by a user or converted from news
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub original_language: Language,
    pub title_zh: Option<String>,
    pub title_en: Option<String>,
    pub body_zh: Option<String>,
    pub body_en: Option<String>,
    pub status: PostStatus,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub moderation_result: Option<String>,
    pub moderation_confidence: Option<f64>,
    pub review_note: Option<String>,
    pub reviewer: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post awaiting review
    pub fn new(author: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            body: body.into(),
            original_language: Language::Unknown,
            title_zh: None,
            title_en: None,
            body_zh: None,
            body_en: None,
            status: PostStatus::PendingReview,
            category: String::new(),
            tags: Vec::new(),
            author: author.into(),
            moderation_result: None,
            moderation_confidence: None,
            review_note: None,
            reviewer: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a translation result to the variant fields
    pub fn apply_translation(&mut self, translation: TranslationResult) {
        self.title_zh = translation.title_zh;
        self.title_en = translation.title_en;
        self.body_zh = translation.body_zh;
        self.body_en = translation.body_en;
    }

    /// True when either title variant is missing
    pub fn needs_translation(&self) -> bool {
        self.title_zh.is_none() || self.title_en.is_none()
    }
}

/// Per-field translation output; `None` means "not produced"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub title_zh: Option<String>,
    pub body_zh: Option<String>,
    pub title_en: Option<String>,
    pub body_en: Option<String>,
}

impl TranslationResult {
    /// Title variant for a target language
    pub fn title(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::Zh => self.title_zh.as_deref(),
            Language::En => self.title_en.as_deref(),
            Language::Th | Language::Unknown => None,
        }
    }

    /// Body variant for a target language
    pub fn body(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::Zh => self.body_zh.as_deref(),
            Language::En => self.body_en.as_deref(),
            Language::Th | Language::Unknown => None,
        }
    }

    /// Number of populated fields
    pub fn populated(&self) -> usize {
        [&self.title_zh, &self.body_zh, &self.title_en, &self.body_en]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }
}

/// Summary of one pipeline cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub processed: usize,
    pub success: usize,
    pub skipped: usize,
    pub error: usize,
}

/// Summary of a news-to-post conversion batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionReport {
    pub total_processed: usize,
    pub success: usize,
    pub skipped: usize,
    pub error: usize,
}

/// Summary of a post translation migration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    pub total: usize,
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}
