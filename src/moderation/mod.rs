//! Content moderation decision engine
//!
//! A candidate post ends in one of three states:
//!
//! ```text
//!                 blocklist hit ──────────────────────────► REJECTED (0.99)
//!   candidate ──► classifier  ── score > 90, safe ────────► APPROVED
//!                             ── score > 90, unsafe ──────► REJECTED
//!                             ── score <= 90 ─────────────► PENDING_REVIEW
//!                             ── service failure ─────────► PENDING_REVIEW (0.0)
//! ```
//!
//! Posts left in `PENDING_REVIEW` are settled by a human reviewer through
//! [`review`].

use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::llm::{extract_json, SharedTextGenerator};
use crate::metrics;
use crate::models::{Post, PostStatus};
use crate::posts::PostError;
use crate::utils::preview;

/// Classifier confidence (0-100) that must be exceeded for an automatic decision
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 90.0;

/// Stored confidence for blocklist rejections
pub const BLOCKLIST_CONFIDENCE: f64 = 0.99;

const DEFAULT_SENSITIVE_TERMS: &[&str] = &[
    "scam", "fraud", "fake", "illegal", "hate", "violence", "drug", "drugs", "weapon", "kill",
    "terror", "porn", "sex", "spam", "phishing", "fuck", "shit", "bitch", "asshole", "rape",
    "欺诈", "诈骗", "非法", "暴力", "仇恨", "恐怖", "色情",
];

/// Immutable multilingual sensitive-term list
#[derive(Debug, Clone)]
pub struct Blocklist {
    terms: Vec<String>,
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_TERMS.iter().copied())
    }
}

impl Blocklist {
    /// Build from terms; blank terms are dropped, matching is case-insensitive
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Built-in terms plus `extra`
    pub fn with_extra_terms<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut blocklist = Self::default();
        blocklist.terms.extend(
            Self::new(extra)
                .terms
                .into_iter()
                .filter(|t| !DEFAULT_SENSITIVE_TERMS.iter().any(|d| d.to_lowercase() == *t)),
        );
        blocklist
    }

    /// First term contained in `text`
    pub fn find_hit(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.terms
            .iter()
            .find(|term| lowered.contains(term.as_str()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Parsed safety-classifier answer
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationVerdict {
    /// `None` when the classifier did not commit either way
    pub is_safe: Option<bool>,
    /// 0-100
    pub confidence: f64,
    pub reason: String,
}

impl ModerationVerdict {
    /// Conservative verdict used when the answer cannot be parsed
    pub fn parse_failed() -> Self {
        Self {
            is_safe: Some(false),
            confidence: 0.0,
            reason: "parse failed".to_string(),
        }
    }

    /// Parse a JSON-shaped answer, tolerating fences, prose and string numbers
    pub fn parse(raw: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(extract_json(raw)) else {
            return Self::parse_failed();
        };
        let Some(obj) = value.as_object() else {
            return Self::parse_failed();
        };

        let is_safe = match obj.get("is_safe") {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        };

        let confidence = match obj.get("confidence_score") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        };
        let Some(confidence) = confidence.filter(|c| c.is_finite()) else {
            return Self::parse_failed();
        };

        let reason = obj
            .get("reason")
            .and_then(Value::as_str)
            .unwrap_or("no reason given")
            .to_string();

        Self {
            is_safe,
            confidence: confidence.clamp(0.0, 100.0),
            reason,
        }
    }
}

/// Decision recorded on a post
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationOutcome {
    pub status: PostStatus,
    /// 0.0-1.0
    pub confidence: f64,
    /// Raw classifier output, or a marker for the non-classifier paths
    pub raw_result: String,
    pub reason: String,
}

impl ModerationOutcome {
    /// Copy the decision onto a post
    pub fn apply_to(&self, post: &mut Post) {
        post.status = self.status;
        post.moderation_result = Some(self.raw_result.clone());
        post.moderation_confidence = Some(self.confidence);
    }
}

/// Tri-state moderation engine
#[derive(Clone)]
pub struct ModerationEngine {
    generator: SharedTextGenerator,
    blocklist: Arc<Blocklist>,
    threshold: f64,
}

impl ModerationEngine {
    pub fn new(generator: SharedTextGenerator, blocklist: Arc<Blocklist>) -> Self {
        Self {
            generator,
            blocklist,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    /// Override the automatic-decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Decide the status of a candidate post
    pub async fn moderate(&self, title: &str, body: &str) -> ModerationOutcome {
        let content = format!("{title} {body}");

        if let Some(term) = self.blocklist.find_hit(&content) {
            tracing::warn!(term, title = %preview(title, 40), "Blocklisted term, rejecting");
            metrics::record_moderation(PostStatus::Rejected.as_str(), "blocklist");
            return ModerationOutcome {
                status: PostStatus::Rejected,
                confidence: BLOCKLIST_CONFIDENCE,
                raw_result: format!("HIT_SENSITIVE_WORD: {term}"),
                reason: "hit sensitive word".to_string(),
            };
        }

        let raw = match self.generator.generate(&build_moderation_prompt(title, body)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Safety classifier unavailable, holding for review");
                metrics::record_moderation(PostStatus::PendingReview.as_str(), "unavailable");
                return ModerationOutcome {
                    status: PostStatus::PendingReview,
                    confidence: 0.0,
                    raw_result: format!("SERVICE_UNAVAILABLE: {e}"),
                    reason: "AI service unavailable, needs manual review".to_string(),
                };
            }
        };

        let verdict = ModerationVerdict::parse(&raw);
        let status = self.decide(&verdict);

        tracing::info!(
            status = %status,
            is_safe = ?verdict.is_safe,
            confidence = verdict.confidence,
            reason = %verdict.reason,
            "Moderation decided"
        );
        metrics::record_moderation(status.as_str(), "classifier");

        ModerationOutcome {
            status,
            confidence: verdict.confidence / 100.0,
            raw_result: raw,
            reason: verdict.reason,
        }
    }

    /// Map a verdict to a status; the threshold itself is not enough
    pub fn decide(&self, verdict: &ModerationVerdict) -> PostStatus {
        if verdict.confidence <= self.threshold {
            return PostStatus::PendingReview;
        }
        match verdict.is_safe {
            Some(true) => PostStatus::Approved,
            Some(false) => PostStatus::Rejected,
            None => PostStatus::PendingReview,
        }
    }
}

/// Structured instruction for the safety classifier
pub fn build_moderation_prompt(title: &str, body: &str) -> String {
    format!(
        "You are a strict content safety reviewer. Evaluate if the post is legal and compliant. \
         Flag fraud, hate speech, pornography, illegal activity. \
         Respond ONLY in JSON with fields: is_safe (boolean), reason (string), confidence_score (0-100). \
         JSON example: {{\"is_safe\": true, \"reason\": \"no violations\", \"confidence_score\": 95}}.\n\
         Title: {title}\nContent: {body}"
    )
}

/// Human reviewer decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Settle a pending post, stamping reviewer, note and time
pub fn review(
    post: &mut Post,
    decision: ReviewDecision,
    reviewer: &str,
    note: Option<&str>,
) -> Result<(), PostError> {
    if post.status != PostStatus::PendingReview {
        return Err(PostError::InvalidTransition {
            id: post.id.clone(),
            from: post.status,
        });
    }

    let now = Utc::now();
    post.status = match decision {
        ReviewDecision::Approve => PostStatus::Approved,
        ReviewDecision::Reject => PostStatus::Rejected,
    };
    post.reviewer = Some(reviewer.to_string());
    post.review_note = note.map(str::to_string);
    post.reviewed_at = Some(now);
    post.updated_at = now;

    Ok(())
}
