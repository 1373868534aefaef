use anyhow::Result;

use newsbridge::config::Config;
use newsbridge::metrics;
use newsbridge::models::PostStatus;

use super::App;

/// Show stored item counts, optionally with the metrics registry
pub async fn stats(config: Config, with_metrics: bool) -> Result<()> {
    let app = App::open(config)?;

    println!("Storage Statistics");
    println!("{:-<40}", "");
    println!("  Database: {}", app.config.database.sqlite_path.display());
    println!("  News items: {}", app.news.count()?);

    let mut total = 0;
    for status in [PostStatus::PendingReview, PostStatus::Approved, PostStatus::Rejected] {
        let count = app.posts.count_by_status(status)?;
        total += count;
        println!("  Posts {:<15} {count}", format!("{status}:"));
    }
    println!("  Posts total:          {total}");

    println!();
    println!("Sources ({})", app.config.sources.len());
    for source in &app.config.sources {
        let via = match (&source.feed_url, &source.site_url) {
            (Some(_), Some(_)) => "feed, page fallback",
            (Some(_), None) => "feed",
            (None, _) => "page",
        };
        println!("  {:<24} {via}", source.name);
    }

    if with_metrics {
        println!();
        match metrics::encode_metrics() {
            Ok(text) => print!("{text}"),
            Err(e) => tracing::warn!(error = %e, "Failed to encode metrics"),
        }
    }

    Ok(())
}
