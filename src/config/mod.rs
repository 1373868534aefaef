//! Configuration management for newsbridge
//!
//! Configuration comes from environment variables with defaults, or from a TOML
//! file given with `--config`. Both paths end in [`Config::validate`]; the API
//! key is checked separately with [`Config::require_credentials`] by commands
//! that call the text generator.

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::crawler::{default_sources, SourceConfig};
use crate::error::Error;
use crate::llm::LlmConfig;
use crate::moderation::DEFAULT_CONFIDENCE_THRESHOLD;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text generation service
    pub llm: LlmConfig,

    /// HTTP fetching
    pub crawler: CrawlerConfig,

    /// Cycle scheduling and limits
    pub pipeline: PipelineConfig,

    /// Storage location
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// News origins, replacing the built-in list when present
    pub sources: Vec<SourceConfig>,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Rate limit (requests per second)
    pub requests_per_second: u32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retry budget per request
    pub max_retries: u32,
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Daily run time, local `HH:MM`
    pub schedule_time: String,

    /// Posts converted after each cycle
    pub conversion_limit: usize,

    /// Summary input cap in characters
    pub summary_max_chars: usize,

    /// Fetch article pages for items without a body
    pub fetch_details: bool,

    /// Classifier confidence (0-100) above which moderation decides automatically
    pub moderation_threshold: f64,

    /// Extra blocklist terms appended to the built-in list
    pub extra_blocked_terms: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 2,
            request_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schedule_time: String::from("08:00"),
            conversion_limit: 20,
            summary_max_chars: 2000,
            fetch_details: true,
            moderation_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            extra_blocked_terms: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("data/newsbridge.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("pretty"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            crawler: CrawlerConfig::default(),
            pipeline: PipelineConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            sources: default_sources(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let crawler = CrawlerConfig {
            requests_per_second: env_parse("NEWSBRIDGE_RATE_LIMIT")
                .unwrap_or(defaults.crawler.requests_per_second),
            request_timeout_secs: env_parse("NEWSBRIDGE_REQUEST_TIMEOUT")
                .unwrap_or(defaults.crawler.request_timeout_secs),
            max_retries: env_parse("NEWSBRIDGE_MAX_RETRIES").unwrap_or(defaults.crawler.max_retries),
        };

        let pipeline = PipelineConfig {
            schedule_time: std::env::var("NEWSBRIDGE_SCHEDULE_TIME")
                .unwrap_or(defaults.pipeline.schedule_time),
            conversion_limit: env_parse("NEWSBRIDGE_CONVERSION_LIMIT")
                .unwrap_or(defaults.pipeline.conversion_limit),
            summary_max_chars: env_parse("NEWSBRIDGE_SUMMARY_MAX_CHARS")
                .unwrap_or(defaults.pipeline.summary_max_chars),
            fetch_details: env_parse("NEWSBRIDGE_FETCH_DETAILS")
                .unwrap_or(defaults.pipeline.fetch_details),
            moderation_threshold: env_parse("NEWSBRIDGE_MODERATION_THRESHOLD")
                .unwrap_or(defaults.pipeline.moderation_threshold),
            extra_blocked_terms: std::env::var("NEWSBRIDGE_BLOCKED_TERMS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        let database = DatabaseConfig {
            sqlite_path: std::env::var("NEWSBRIDGE_SQLITE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database.sqlite_path),
        };

        let logging = LoggingConfig {
            level: std::env::var("NEWSBRIDGE_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: std::env::var("NEWSBRIDGE_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Ok(Self {
            llm: LlmConfig::from_env(),
            crawler,
            pipeline,
            database,
            logging,
            sources: defaults.sources,
        })
    }

    /// Load configuration from a file
    ///
    /// The API key may be left out of the file; `DASHSCOPE_API_KEY` fills it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        if config.llm.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var("DASHSCOPE_API_KEY") {
                config.llm.api_key = key;
            }
        }

        Ok(config)
    }

    /// Load from `path` when given, else from the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.crawler.requests_per_second == 0 {
            anyhow::bail!("requests_per_second must be greater than 0");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        self.schedule_time()?;

        if self.pipeline.summary_max_chars == 0 {
            anyhow::bail!("summary_max_chars must be greater than 0");
        }

        if !(0.0..=100.0).contains(&self.pipeline.moderation_threshold) {
            anyhow::bail!("moderation_threshold must be within 0-100");
        }

        if self.sources.is_empty() {
            anyhow::bail!("at least one news source must be configured");
        }

        for source in &self.sources {
            if source.feed_url.is_none() && source.site_url.is_none() {
                anyhow::bail!("source '{}' needs a feed_url or a site_url", source.name);
            }
            if source.max_items == 0 {
                anyhow::bail!("source '{}' max_items must be greater than 0", source.name);
            }
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            anyhow::bail!("logging.format must be 'pretty' or 'json'");
        }

        Ok(())
    }

    /// Fail fast when the text generator has no credentials
    pub fn require_credentials(&self) -> std::result::Result<(), Error> {
        if self.llm.has_credentials() {
            Ok(())
        } else {
            Err(Error::config(
                "missing API key: set DASHSCOPE_API_KEY or llm.api_key",
            ))
        }
    }

    /// Parsed daily run time
    pub fn schedule_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.pipeline.schedule_time, "%H:%M").with_context(|| {
            format!(
                "schedule_time must be HH:MM, got '{}'",
                self.pipeline.schedule_time
            )
        })
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }
}
