mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsbridge::config::Config;
use newsbridge::metrics;

#[derive(Parser)]
#[command(
    name = "newsbridge",
    version,
    about = "Multilingual news ingestion, translation and moderation pipeline",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (pretty, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file; environment variables are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one pipeline cycle now
    Run,

    /// Run the pipeline every day at the configured time
    Schedule {
        /// Also run one cycle immediately
        #[arg(long, default_value = "false")]
        now: bool,
    },

    /// Submit a user post
    Submit {
        /// Post author
        #[arg(short, long)]
        author: String,

        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post body
        #[arg(short, long)]
        body: String,
    },

    /// Approve or reject a pending post
    Review {
        /// Post ID
        post_id: String,

        /// Approve the post
        #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
        approve: bool,

        /// Reject the post
        #[arg(long)]
        reject: bool,

        /// Reviewer name
        #[arg(long, default_value = "admin")]
        reviewer: String,

        /// Review note
        #[arg(long)]
        note: Option<String>,
    },

    /// List posts by status
    List {
        /// Post status (pending_review, approved, rejected)
        #[arg(short, long, default_value = "approved")]
        status: String,

        /// Page number, starting at 0
        #[arg(short, long, default_value = "0")]
        page: usize,

        /// Page size
        #[arg(long, default_value = "20")]
        size: usize,

        /// Reader language (zh, en)
        #[arg(short, long, default_value = "en")]
        lang: String,
    },

    /// Translate stored posts missing zh/en variants
    TranslatePosts {
        /// Maximum posts to translate
        #[arg(short, long, default_value = "100")]
        limit: usize,

        /// Retranslate posts that already have variants
        #[arg(long, default_value = "false")]
        force: bool,
    },

    /// Delete every post in a status
    Cleanup {
        /// Post status to delete
        #[arg(short, long)]
        status: String,

        /// Confirm deletion
        #[arg(long, default_value = "false")]
        yes: bool,
    },

    /// Show storage statistics
    Stats {
        /// Also print the Prometheus metrics registry
        #[arg(long, default_value = "false")]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing/logging
    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    if let Err(e) = metrics::init_metrics() {
        tracing::warn!(error = %e, "Metrics disabled");
    }

    tracing::info!("newsbridge starting");

    match cli.command {
        Commands::Run => {
            tracing::info!("Starting run command");
            commands::run(config).await?;
        }

        Commands::Schedule { now } => {
            tracing::info!(
                schedule_time = %config.pipeline.schedule_time,
                run_now = %now,
                "Starting schedule command"
            );
            commands::schedule(config, now).await?;
        }

        Commands::Submit {
            author,
            title,
            body,
        } => {
            tracing::info!(author = %author, "Starting submit command");
            commands::submit(config, author, title, body).await?;
        }

        Commands::Review {
            post_id,
            approve,
            reject: _,
            reviewer,
            note,
        } => {
            tracing::info!(post_id = %post_id, approve = %approve, "Starting review command");
            commands::review(config, post_id, approve, reviewer, note).await?;
        }

        Commands::List {
            status,
            page,
            size,
            lang,
        } => {
            commands::list(config, status, page, size, lang).await?;
        }

        Commands::TranslatePosts { limit, force } => {
            tracing::info!(limit = %limit, force = %force, "Starting translate-posts command");
            commands::translate_posts(config, limit, force).await?;
        }

        Commands::Cleanup { status, yes } => {
            tracing::info!(status = %status, "Starting cleanup command");
            commands::cleanup(config, status, yes).await?;
        }

        Commands::Stats { metrics } => {
            commands::stats(config, metrics).await?;
        }
    }

    tracing::info!("newsbridge completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("newsbridge=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("newsbridge={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
