//! CLI command handlers

pub mod pipeline;
pub mod posts;
pub mod stats;

use anyhow::{Context, Result};
use std::sync::Arc;

use newsbridge::config::Config;
use newsbridge::converter::NewsToPostConverter;
use newsbridge::crawler::fetcher::PageFetcher;
use newsbridge::crawler::NewsSource;
use newsbridge::language::LanguageClassifier;
use newsbridge::llm::{LlmClient, SharedTextGenerator};
use newsbridge::moderation::{Blocklist, ModerationEngine};
use newsbridge::posts::PostService;
use newsbridge::scheduler::PipelineScheduler;
use newsbridge::storage::{create_sqlite_repositories, SharedNewsRepository, SharedPostRepository};
use newsbridge::summary::Summarizer;
use newsbridge::translation::TranslationOrchestrator;

pub use pipeline::{run, schedule};
pub use posts::{cleanup, list, review, submit, translate_posts};
pub use stats::stats;

/// Wired components shared by the commands
pub struct App {
    pub config: Config,
    pub news: SharedNewsRepository,
    pub posts: SharedPostRepository,
    pub classifier: Arc<LanguageClassifier>,
    generator: Option<SharedTextGenerator>,
}

impl App {
    /// Open storage only; commands that need the text generator call [`App::with_llm`]
    pub fn open(config: Config) -> Result<Self> {
        let (news, posts) = create_sqlite_repositories(&config.database.sqlite_path)
            .with_context(|| {
                format!("Failed to open database {}", config.database.sqlite_path.display())
            })?;

        Ok(Self {
            config,
            news,
            posts,
            classifier: Arc::new(LanguageClassifier::default()),
            generator: None,
        })
    }

    /// Require credentials and build the text generator
    pub fn with_llm(mut self) -> Result<Self> {
        self.config.require_credentials()?;
        let client = LlmClient::with_config(self.config.llm.clone())
            .context("Failed to create text generation client")?;
        tracing::info!(model = %client.model(), "Text generator ready");
        self.generator = Some(Arc::new(client));
        Ok(self)
    }

    fn generator(&self) -> Result<SharedTextGenerator> {
        self.generator
            .clone()
            .context("text generator not configured")
    }

    pub fn translator(&self) -> Result<TranslationOrchestrator> {
        Ok(TranslationOrchestrator::new(self.generator()?, self.classifier.clone()))
    }

    pub fn moderation(&self) -> Result<ModerationEngine> {
        let blocklist = Blocklist::with_extra_terms(&self.config.pipeline.extra_blocked_terms);
        Ok(ModerationEngine::new(self.generator()?, Arc::new(blocklist))
            .with_threshold(self.config.pipeline.moderation_threshold))
    }

    pub fn post_service(&self) -> Result<PostService> {
        Ok(PostService::new(
            self.posts.clone(),
            self.translator()?,
            self.moderation()?,
            self.classifier.clone(),
        ))
    }

    pub fn scheduler(&self) -> Result<PipelineScheduler> {
        let crawler = &self.config.crawler;
        let fetcher = PageFetcher::with_config(
            crawler.requests_per_second,
            crawler.max_retries,
            self.config.request_timeout(),
        )
        .context("Failed to create fetcher")?;
        let source = NewsSource::new(Arc::new(fetcher), self.config.sources.clone());

        let translator = self.translator()?;
        let converter =
            NewsToPostConverter::new(self.news.clone(), self.posts.clone(), translator.clone());
        let summarizer = Summarizer::new(self.generator()?)
            .with_max_input_chars(self.config.pipeline.summary_max_chars);

        Ok(PipelineScheduler::new(
            Arc::new(source),
            self.news.clone(),
            summarizer,
            translator,
            converter,
            self.classifier.clone(),
        )
        .with_conversion_limit(self.config.pipeline.conversion_limit)
        .with_fetch_details(self.config.pipeline.fetch_details))
    }
}
