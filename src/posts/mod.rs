//! Post submission, human review and admin operations
//!
//! User posts are translated and moderated synchronously at submission. That is
//! up to four translation calls plus one moderation call in sequence, so a slow
//! text generator directly slows the submitting request.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::language::LanguageClassifier;
use crate::models::{MigrationReport, Post, PostStatus, TranslationResult};
use crate::moderation::{review, ModerationEngine, ReviewDecision};
use crate::storage::{Page, SharedPostRepository};
use crate::translation::TranslationOrchestrator;
use crate::utils::{is_blank, preview};

/// Post lifecycle errors
#[derive(Debug, Error)]
pub enum PostError {
    /// Review attempted on a post that is not pending
    #[error("post {id} is {from}, only PENDING_REVIEW posts can be reviewed")]
    InvalidTransition { id: String, from: PostStatus },

    /// No post with this ID
    #[error("post not found: {0}")]
    NotFound(String),

    /// Title or body missing
    #[error("post {0} must not be empty")]
    EmptyField(&'static str),
}

/// Entry point for the flows an HTTP layer would expose
pub struct PostService {
    posts: SharedPostRepository,
    translator: TranslationOrchestrator,
    moderation: ModerationEngine,
    classifier: Arc<LanguageClassifier>,
}

impl PostService {
    pub fn new(
        posts: SharedPostRepository,
        translator: TranslationOrchestrator,
        moderation: ModerationEngine,
        classifier: Arc<LanguageClassifier>,
    ) -> Self {
        Self {
            posts,
            translator,
            moderation,
            classifier,
        }
    }

    /// Detect, translate, moderate and store a user post
    pub async fn submit(&self, author: &str, title: &str, body: &str) -> Result<Post> {
        if is_blank(title) {
            return Err(PostError::EmptyField("title").into());
        }
        if is_blank(body) {
            return Err(PostError::EmptyField("body").into());
        }

        let mut post = Post::new(author, title.trim(), body.trim());
        post.original_language = self.classifier.detect(&format!("{} {}", post.title, post.body));

        let translation = self
            .translator
            .translate(&post.title, &post.body, post.original_language)
            .await;
        post.apply_translation(translation);

        let outcome = self.moderation.moderate(&post.title, &post.body).await;
        outcome.apply_to(&mut post);

        self.posts.save(&post)?;

        tracing::info!(
            post_id = %post.id,
            author,
            language = %post.original_language,
            status = %post.status,
            "Post submitted"
        );
        Ok(post)
    }

    /// Look up a post
    pub fn get(&self, post_id: &str) -> Result<Post> {
        self.posts
            .find_by_id(post_id)?
            .ok_or_else(|| PostError::NotFound(post_id.to_string()).into())
    }

    /// Approve a pending post
    pub fn approve(&self, post_id: &str, reviewer: &str, note: Option<&str>) -> Result<Post> {
        self.settle(post_id, ReviewDecision::Approve, reviewer, note)
    }

    /// Reject a pending post
    pub fn reject(&self, post_id: &str, reviewer: &str, note: Option<&str>) -> Result<Post> {
        self.settle(post_id, ReviewDecision::Reject, reviewer, note)
    }

    fn settle(
        &self,
        post_id: &str,
        decision: ReviewDecision,
        reviewer: &str,
        note: Option<&str>,
    ) -> Result<Post> {
        let mut post = self.get(post_id)?;
        review(&mut post, decision, reviewer, note)?;
        self.posts.update(&post)?;

        tracing::info!(post_id, reviewer, status = %post.status, "Post reviewed");
        Ok(post)
    }

    /// Posts in a status, newest first
    pub fn list_by_status(&self, status: PostStatus, page: Page) -> Result<Vec<Post>> {
        self.posts.find_by_status(status, page)
    }

    /// Number of posts in a status
    pub fn count_by_status(&self, status: PostStatus) -> Result<usize> {
        self.posts.count_by_status(status)
    }

    /// Fill missing title/body variants; `force` retranslates every post
    pub async fn translate_untranslated(&self, limit: usize, force: bool) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();
        let mut candidates = Vec::new();
        let mut page = Page::first(100);

        loop {
            let batch = self.posts.find_all(page)?;
            if batch.is_empty() {
                break;
            }
            candidates.extend(batch.into_iter().filter(|p| force || p.needs_translation()));
            if candidates.len() >= limit {
                break;
            }
            page.number += 1;
        }
        candidates.truncate(limit);
        report.total = candidates.len();

        for mut post in candidates {
            if is_blank(&post.title) {
                report.skipped += 1;
                continue;
            }

            let language = self.classifier.detect(&format!("{} {}", post.title, post.body));
            let translation = self.translator.translate(&post.title, &post.body, language).await;
            if translation.title_zh.is_none() && translation.title_en.is_none() {
                report.failed += 1;
                tracing::warn!(post_id = %post.id, title = %preview(&post.title, 40), "No title variant produced");
                continue;
            }

            post.original_language = language;
            merge_translation(&mut post, translation, force);
            post.updated_at = Utc::now();

            match self.posts.update(&post) {
                Ok(()) => report.translated += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(post_id = %post.id, error = %e, "Failed to store translation");
                }
            }
        }

        tracing::info!(
            total = report.total,
            translated = report.translated,
            skipped = report.skipped,
            failed = report.failed,
            "Post translation pass finished"
        );
        Ok(report)
    }

    /// Explicit admin bulk delete; the only deletion path
    pub fn cleanup(&self, status: PostStatus) -> Result<usize> {
        let removed = self.posts.delete_by_status(status)?;
        tracing::warn!(status = %status, removed, "Bulk-deleted posts");
        Ok(removed)
    }
}

/// Keep existing variants unless forced; never overwrite with `None`
fn merge_translation(post: &mut Post, translation: TranslationResult, force: bool) {
    fn merge(slot: &mut Option<String>, new: Option<String>, force: bool) {
        if new.is_some() && (force || slot.is_none()) {
            *slot = new;
        }
    }

    merge(&mut post.title_zh, translation.title_zh, force);
    merge(&mut post.body_zh, translation.body_zh, force);
    merge(&mut post.title_en, translation.title_en, force);
    merge(&mut post.body_en, translation.body_en, force);
}
