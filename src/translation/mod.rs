//! Translation orchestration
//!
//! Produces Chinese and English variants of a `(title, body)` pair. Each of the
//! four fields is translated independently and validated before it is kept:
//!
//! - source already in the target language: copied verbatim, no call made
//! - empty output, or output identical to the input: rejected
//! - Chinese target without any ideograph, or dominated by another script: rejected
//! - English target dominated by Thai or CJK: rejected
//!
//! A rejected or failed field stays `None`. Service errors are logged and never
//! returned to the caller.

pub mod format;

use std::sync::Arc;

use crate::language::{LanguageClassifier, Script, ScriptCounts};
use crate::llm::SharedTextGenerator;
use crate::metrics;
use crate::models::{Language, TranslationResult};
use crate::utils::{is_blank, preview};

pub use format::{compose_body, extract_actual_content, rebuild_structured_body};

/// Why a candidate translation was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Empty,
    IdenticalToSource,
    MissingTargetScript,
    WrongDominantScript,
}

impl Rejection {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::IdenticalToSource => "identical",
            Self::MissingTargetScript => "missing_script",
            Self::WrongDominantScript => "wrong_script",
        }
    }
}

/// Builds zh/en variants through the text generator
#[derive(Clone)]
pub struct TranslationOrchestrator {
    generator: SharedTextGenerator,
    classifier: Arc<LanguageClassifier>,
}

impl TranslationOrchestrator {
    pub fn new(generator: SharedTextGenerator, classifier: Arc<LanguageClassifier>) -> Self {
        Self {
            generator,
            classifier,
        }
    }

    pub fn classifier(&self) -> &LanguageClassifier {
        &self.classifier
    }

    /// Translate a title and a (possibly structured) body into every target
    pub async fn translate(&self, title: &str, body: &str, source: Language) -> TranslationResult {
        self.translate_with_sources(title, source, body, source).await
    }

    /// Like [`translate`](Self::translate), with separate source languages
    /// for the title and the body
    pub async fn translate_with_sources(
        &self,
        title: &str,
        title_source: Language,
        body: &str,
        body_source: Language,
    ) -> TranslationResult {
        let mut result = TranslationResult::default();

        for target in Language::TARGETS {
            let title_variant = self.translate_field(title, title_source, target, "title").await;
            let body_variant = self.translate_body(body, body_source, target).await;

            match target {
                Language::Zh => {
                    result.title_zh = title_variant;
                    result.body_zh = body_variant;
                }
                Language::En => {
                    result.title_en = title_variant;
                    result.body_en = body_variant;
                }
                Language::Th | Language::Unknown => {}
            }
        }

        tracing::info!(
            title_source = %title_source,
            body_source = %body_source,
            title = %preview(title, 30),
            populated = result.populated(),
            "Translation finished"
        );

        result
    }

    /// Translate plain text into one target, copying when already in it
    pub async fn translate_field(
        &self,
        text: &str,
        source: Language,
        target: Language,
        field: &'static str,
    ) -> Option<String> {
        if is_blank(text) {
            return None;
        }
        if source == target {
            if !has_thai(text) {
                return Some(text.to_string());
            }
            // Mislabelled Thai text is translated, never copied
            return self.translate_text(text, Language::Th, target, field).await;
        }
        self.translate_text(text, source, target, field).await
    }

    async fn translate_body(&self, body: &str, source: Language, target: Language) -> Option<String> {
        if is_blank(body) {
            return None;
        }
        let core = extract_actual_content(body);
        let source = if source == target {
            if !has_thai(&core) {
                return Some(body.to_string());
            }
            Language::Th
        } else {
            source
        };

        let translated = self.translate_text(&core, source, target, "body").await?;
        let rebuilt = rebuild_structured_body(body, &translated);

        // Whatever the rebuild carried over from the original must pass too
        if let Err(rejection) = self.validate(&extract_actual_content(&rebuilt), &core, target) {
            metrics::record_translation(target.as_str(), rejection.as_str());
            tracing::warn!(
                field = "body",
                target = %target,
                reason = ?rejection,
                "Discarded rebuilt body"
            );
            return None;
        }
        Some(rebuilt)
    }

    async fn translate_text(
        &self,
        text: &str,
        source: Language,
        target: Language,
        field: &'static str,
    ) -> Option<String> {
        if is_blank(text) {
            return None;
        }

        let prompt = build_translation_prompt(text, source, target);
        match self.generator.generate(&prompt).await {
            Ok(candidate) => match self.validate(&candidate, text, target) {
                Ok(()) => {
                    metrics::record_translation(target.as_str(), "ok");
                    tracing::debug!(field, target = %target, chars = candidate.chars().count(), "Translated");
                    Some(candidate.trim().to_string())
                }
                Err(rejection) => {
                    metrics::record_translation(target.as_str(), rejection.as_str());
                    tracing::warn!(
                        field,
                        target = %target,
                        reason = ?rejection,
                        text = %preview(text, 50),
                        "Discarded translation"
                    );
                    None
                }
            },
            Err(e) => {
                metrics::record_translation(target.as_str(), "error");
                tracing::warn!(field, target = %target, error = %e, "Translation call failed");
                None
            }
        }
    }

    /// Check a candidate translation of `source_text` into `target`
    pub fn validate(&self, candidate: &str, source_text: &str, target: Language) -> Result<(), Rejection> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(Rejection::Empty);
        }
        if candidate == source_text.trim() {
            return Err(Rejection::IdenticalToSource);
        }

        match target {
            Language::Zh => {
                if !self.classifier.contains_script(candidate, Script::Cjk) {
                    return Err(Rejection::MissingTargetScript);
                }
                if self.classifier.is_dominant(candidate, Script::Thai)
                    || self.classifier.is_dominant(candidate, Script::Latin)
                {
                    return Err(Rejection::WrongDominantScript);
                }
            }
            Language::En => {
                if self.classifier.is_dominant(candidate, Script::Thai)
                    || self.classifier.is_dominant(candidate, Script::Cjk)
                {
                    return Err(Rejection::WrongDominantScript);
                }
            }
            Language::Th | Language::Unknown => {}
        }

        Ok(())
    }
}

/// Any Thai letter means the text still needs translating
fn has_thai(text: &str) -> bool {
    ScriptCounts::of(text).get(Script::Thai) > 0
}

/// Instruction sent to the text generator for one translation
pub fn build_translation_prompt(text: &str, source: Language, target: Language) -> String {
    format!(
        "You are a professional translator. Translate the following text from {} to {}.\n\n\
         IMPORTANT RULES:\n\
         1. Translate the meaning of the text only. Do not add explanations or notes.\n\
         2. Keep line breaks and paragraph structure exactly as they are.\n\
         3. Keep emojis, numbers, names of people and organisations recognisable.\n\
         4. Return ONLY the translated text.\n\n\
         Text to translate:\n{}",
        source.display_name(),
        target.display_name(),
        text
    )
}
