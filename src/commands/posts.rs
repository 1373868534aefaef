use anyhow::{bail, Context, Result};

use newsbridge::config::Config;
use newsbridge::models::{Language, Post, PostStatus};
use newsbridge::reader::LocalizedView;
use newsbridge::storage::Page;
use newsbridge::utils::preview;

use super::App;

/// Submit a user post through translation and moderation
pub async fn submit(config: Config, author: String, title: String, body: String) -> Result<()> {
    let app = App::open(config)?.with_llm()?;
    let service = app.post_service()?;

    let post = service
        .submit(&author, &title, &body)
        .await
        .context("Failed to submit post")?;

    println!("Post submitted");
    println!("  ID:       {}", post.id);
    println!("  Language: {}", post.original_language);
    println!("  Status:   {}", post.status);
    if let Some(reason) = &post.moderation_result {
        println!("  Reason:   {reason}");
    }
    println!("  zh title: {}", post.title_zh.as_deref().unwrap_or("-"));
    println!("  en title: {}", post.title_en.as_deref().unwrap_or("-"));

    Ok(())
}

/// Approve or reject a pending post
pub async fn review(
    config: Config,
    post_id: String,
    approve: bool,
    reviewer: String,
    note: Option<String>,
) -> Result<()> {
    let app = App::open(config)?.with_llm()?;
    let service = app.post_service()?;

    let post = if approve {
        service.approve(&post_id, &reviewer, note.as_deref())?
    } else {
        service.reject(&post_id, &reviewer, note.as_deref())?
    };

    println!("Post {} is now {}", post.id, post.status);
    Ok(())
}

/// List posts in a status as seen by a reader of `lang`
pub async fn list(config: Config, status: String, page: usize, size: usize, lang: String) -> Result<()> {
    let status: PostStatus = status.parse().map_err(anyhow::Error::msg)?;
    let lang: Language = lang.parse().unwrap_or(Language::Unknown);
    if size == 0 {
        bail!("page size must be greater than 0");
    }

    let app = App::open(config)?;
    let total = app.posts.count_by_status(status)?;
    let posts = app.posts.find_by_status(status, Page::new(page, size))?;

    println!("{status} posts: {total} (page {page}, showing {})", posts.len());
    println!("{:-<60}", "");
    for post in &posts {
        print_post(post, lang);
    }

    Ok(())
}

/// Fill missing translations on stored posts
pub async fn translate_posts(config: Config, limit: usize, force: bool) -> Result<()> {
    let app = App::open(config)?.with_llm()?;
    let service = app.post_service()?;

    let report = service.translate_untranslated(limit, force).await?;

    println!("Post Translation Summary");
    println!("{:-<40}", "");
    println!("  Candidates: {}", report.total);
    println!("  Translated: {}", report.translated);
    println!("  Skipped:    {}", report.skipped);
    println!("  Failed:     {}", report.failed);

    Ok(())
}

/// Delete every post in a status
pub async fn cleanup(config: Config, status: String, yes: bool) -> Result<()> {
    let status: PostStatus = status.parse().map_err(anyhow::Error::msg)?;
    if !yes {
        bail!("refusing to delete {status} posts without --yes");
    }

    let app = App::open(config)?.with_llm()?;
    let removed = app.post_service()?.cleanup(status)?;

    println!("Deleted {removed} {status} posts");
    Ok(())
}

fn print_post(post: &Post, lang: Language) {
    let view = LocalizedView::for_post(post, lang);
    println!(
        "{}  [{}] {}",
        post.created_at.format("%Y-%m-%d %H:%M"),
        post.author,
        preview(&view.title, 60)
    );
    println!("    id: {}  tags: {}", post.id, post.tags.join(", "));
    println!("    {}", preview(&view.body, 100));
}
