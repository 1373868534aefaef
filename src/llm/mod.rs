//! Text generation client
//!
//! Thin adapter over an OpenAI-compatible chat completions endpoint
//! (DashScope's compatible mode by default). Everything above this module
//! depends only on the [`TextGenerator`] trait: prompt in, text out, or an
//! [`LlmError`] the caller degrades gracefully on.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the text generation service
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API key configured
    #[error("API key is not configured")]
    MissingApiKey,

    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Non-success status from the service
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Service answered without any content
    #[error("Empty response from text generation service")]
    EmptyResponse,

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether the same call may succeed later
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MissingApiKey => false,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => true,
        }
    }
}

/// Capability to turn a prompt into generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Shared handle to a text generator
pub type SharedTextGenerator = Arc<dyn TextGenerator>;

/// Configuration for the text generation client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API
    pub endpoint: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Model name to use
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://dashscope-intl.aliyuncs.com/compatible-mode/v1".to_string(),
            api_key: String::new(),
            model: "qwen-max".to_string(),
            timeout_secs: 60,
            max_tokens: 2048,
            temperature: 0.3,
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            endpoint: std::env::var("NEWSBRIDGE_LLM_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key: std::env::var("DASHSCOPE_API_KEY")
                .or_else(|_| std::env::var("NEWSBRIDGE_LLM_API_KEY"))
                .unwrap_or_default(),
            model: std::env::var("NEWSBRIDGE_LLM_MODEL").unwrap_or(defaults.model),
            timeout_secs: std::env::var("NEWSBRIDGE_LLM_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_tokens: std::env::var("NEWSBRIDGE_LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: std::env::var("NEWSBRIDGE_LLM_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
        }
    }

    /// True when a non-blank API key is present
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for the text generation service
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a client, failing fast when credentials are absent
    pub fn with_config(config: LlmConfig) -> Result<Self, LlmError> {
        if !config.has_credentials() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Model the client talks to
    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(model = %self.config.model, prompt_chars = prompt.chars().count(), "Calling text generation service");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(content)
    }
}

/// Extract the JSON object from a model answer
///
/// Handles fenced ```json blocks, generic fences, and prose around a bare object.
pub fn extract_json(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        let body = &text[start + 7..];
        if let Some(end) = body.find("```") {
            return body[..end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let after_start = &text[start + 3..];
        let content_start = after_start.find('\n').map(|i| i + 1).unwrap_or(0);
        if let Some(end) = after_start[content_start..].find("```") {
            return after_start[content_start..content_start + end].trim();
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            return &text[start..=end];
        }
    }

    text.trim()
}

type Responder = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// In-memory text generator that answers from a closure and counts calls
///
/// Useful for testing without a network dependency.
pub struct MockTextGenerator {
    responder: Box<Responder>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockTextGenerator {
    /// Answer every prompt with `responder`
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer every prompt with the same text
    pub fn fixed(answer: impl Into<String>) -> Self {
        let answer = answer.into();
        Self::new(move |_| Ok(answer.clone()))
    }

    /// Fail every call with a 503
    pub fn failing() -> Self {
        Self::new(|_| {
            Err(LlmError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        })
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        (self.responder)(prompt)
    }
}
