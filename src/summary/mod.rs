//! Short Chinese summaries of news items

use crate::error::{Error, LlmError, Result};
use crate::llm::SharedTextGenerator;
use crate::utils::{is_blank, preview, truncate_chars};

/// Input is capped at this many characters before the call
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2000;

/// Summarizer backed by the text generator
#[derive(Clone)]
pub struct Summarizer {
    generator: SharedTextGenerator,
    max_input_chars: usize,
}

impl Summarizer {
    pub fn new(generator: SharedTextGenerator) -> Self {
        Self {
            generator,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    /// Override the input cap
    #[must_use]
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// Summarize `content`; blank input yields an empty summary without a call
    pub async fn summarize(&self, content: &str) -> Result<String> {
        if is_blank(content) {
            return Ok(String::new());
        }

        let input = truncate_chars(content.trim(), self.max_input_chars);
        let summary = self.generator.generate(&build_summary_prompt(&input)).await?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(Error::Llm(LlmError::EmptyResponse));
        }

        tracing::debug!(summary = %preview(summary, 40), "Generated summary");
        Ok(summary.to_string())
    }

    /// Summary for one item, degrading instead of failing
    ///
    /// Input is the body, else the feed summary, else the title. On failure the
    /// feed summary is kept, or the title when there is none.
    pub async fn summarize_item(
        &self,
        title: &str,
        feed_summary: Option<&str>,
        content: Option<&str>,
    ) -> String {
        let feed_summary = feed_summary.filter(|s| !is_blank(s));
        let input = content
            .filter(|c| !is_blank(c))
            .or(feed_summary)
            .unwrap_or(title);

        match self.summarize(input).await {
            Ok(summary) if !summary.is_empty() => summary,
            Ok(_) => feed_summary.unwrap_or(title).to_string(),
            Err(e) => {
                tracing::warn!(title = %preview(title, 40), error = %e, "Summary failed, keeping fallback");
                feed_summary.unwrap_or(title).to_string()
            }
        }
    }
}

/// Summary instruction
pub fn build_summary_prompt(content: &str) -> String {
    format!(
        "Please read the following news content and generate a brief summary in Chinese \
         (not exceeding 100 characters): {content}"
    )
}
