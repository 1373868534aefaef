//! Repository Pattern for news and post storage
//!
//! Business logic talks to two narrow traits, never to SQL:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │       Scheduler / Converter / PostService / Reader          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          NewsRepository          PostRepository             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!               ┌──────────────┴──────────────┐
//!               ▼                             ▼
//!      ┌─────────────────┐           ┌─────────────────┐
//!      │     SQLite      │           │    In-memory    │
//!      │  Implementation │           │ Implementation  │
//!      └─────────────────┘           └─────────────────┘
//! ```
//!
//! News rows are unique on `canonical_url`; a second insert of the same URL
//! fails with [`Error::Duplicate`] in both implementations, so concurrent
//! dedup checks cannot race into duplicate rows.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::Page;
use crate::error::{Error, Result};
use crate::models::{Language, News, Post, PostStatus};

// ============================================================================
// Repository Traits
// ============================================================================

/// Storage for fetched news items
pub trait NewsRepository: Send + Sync {
    /// Look up an item by its deduplication key
    fn find_by_canonical_url(&self, url: &str) -> Result<Option<News>>;

    /// Whether an item with this canonical URL is stored
    fn exists_by_canonical_url(&self, url: &str) -> Result<bool> {
        Ok(self.find_by_canonical_url(url)?.is_some())
    }

    /// Look up an item by ID
    fn find_by_id(&self, id: &str) -> Result<Option<News>>;

    /// Insert a new item; fails with `Duplicate` on a known canonical URL
    fn save(&self, news: &News) -> Result<()>;

    /// Overwrite an existing item
    fn update(&self, news: &News) -> Result<()>;

    /// All items, newest first
    fn find_all(&self, page: Page) -> Result<Vec<News>>;

    /// Items created in `[from, to)`, newest first
    fn find_by_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<News>>;

    /// Total number of items
    fn count(&self) -> Result<usize>;
}

/// Storage for community posts
pub trait PostRepository: Send + Sync {
    /// Look up a post by ID
    fn find_by_id(&self, id: &str) -> Result<Option<Post>>;

    /// Posts with exactly this title
    fn find_by_title(&self, title: &str) -> Result<Vec<Post>>;

    /// Insert a new post
    fn save(&self, post: &Post) -> Result<()>;

    /// Overwrite an existing post
    fn update(&self, post: &Post) -> Result<()>;

    /// Posts in a status, newest first
    fn find_by_status(&self, status: PostStatus, page: Page) -> Result<Vec<Post>>;

    /// Number of posts in a status
    fn count_by_status(&self, status: PostStatus) -> Result<usize>;

    /// All posts, newest first
    fn find_all(&self, page: Page) -> Result<Vec<Post>>;

    /// Remove every post in a status, returning how many were removed
    fn delete_by_status(&self, status: PostStatus) -> Result<usize>;
}

// ============================================================================
// SQLite Implementation
// ============================================================================

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
    Ok(conn)
}

const NEWS_COLUMNS: &str = "id, title, summary, content, source, canonical_url, image_url, \
     original_language, title_zh, title_en, summary_zh, summary_en, published_at, created_at";

fn news_from_row(row: &Row<'_>) -> rusqlite::Result<News> {
    Ok(News {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        content: row.get(3)?,
        source: row.get(4)?,
        canonical_url: row.get(5)?,
        image_url: row.get(6)?,
        original_language: row
            .get::<_, String>(7)?
            .parse()
            .unwrap_or(Language::Unknown),
        title_zh: row.get(8)?,
        title_en: row.get(9)?,
        summary_zh: row.get(10)?,
        summary_en: row.get(11)?,
        published_at: parse_ts(&row.get::<_, String>(12)?),
        created_at: parse_ts(&row.get::<_, String>(13)?),
    })
}

/// SQLite implementation of NewsRepository
///
/// Uses `Mutex` to ensure thread-safety for the SQLite connection.
pub struct SqliteNewsRepository {
    conn: Mutex<Connection>,
}

impl SqliteNewsRepository {
    /// Open (or create) a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Self {
            conn: Mutex::new(open_connection(path)?),
        };
        repo.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite news repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let repo = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::other("SQLite news connection lock poisoned"))
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS news (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    summary TEXT,
                    content TEXT,
                    source TEXT NOT NULL,
                    canonical_url TEXT NOT NULL UNIQUE,
                    image_url TEXT,
                    original_language TEXT NOT NULL DEFAULT 'unknown',
                    title_zh TEXT,
                    title_en TEXT,
                    summary_zh TEXT,
                    summary_en TEXT,
                    published_at TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_news_created_at
                    ON news(created_at);
                "#,
        )?;
        Ok(())
    }

    fn query_news(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<News>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, news_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl NewsRepository for SqliteNewsRepository {
    fn find_by_canonical_url(&self, url: &str) -> Result<Option<News>> {
        let conn = self.lock()?;
        let news = conn
            .query_row(
                &format!("SELECT {NEWS_COLUMNS} FROM news WHERE canonical_url = ?1"),
                params![url],
                news_from_row,
            )
            .optional()?;
        Ok(news)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<News>> {
        let conn = self.lock()?;
        let news = conn
            .query_row(
                &format!("SELECT {NEWS_COLUMNS} FROM news WHERE id = ?1"),
                params![id],
                news_from_row,
            )
            .optional()?;
        Ok(news)
    }

    fn save(&self, news: &News) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO news ({NEWS_COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                news.id,
                news.title,
                news.summary,
                news.content,
                news.source,
                news.canonical_url,
                news.image_url,
                news.original_language.as_str(),
                news.title_zh,
                news.title_en,
                news.summary_zh,
                news.summary_en,
                format_ts(&news.published_at),
                format_ts(&news.created_at),
            ],
        )
        .map_err(|e| match Error::from(e) {
            Error::Duplicate { .. } => Error::duplicate("news", news.canonical_url.clone()),
            other => other,
        })?;
        Ok(())
    }

    fn update(&self, news: &News) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            r#"
                UPDATE news SET title = ?2, summary = ?3, content = ?4, source = ?5,
                    image_url = ?6, original_language = ?7, title_zh = ?8, title_en = ?9,
                    summary_zh = ?10, summary_en = ?11, published_at = ?12
                WHERE id = ?1
                "#,
            params![
                news.id,
                news.title,
                news.summary,
                news.content,
                news.source,
                news.image_url,
                news.original_language.as_str(),
                news.title_zh,
                news.title_en,
                news.summary_zh,
                news.summary_en,
                format_ts(&news.published_at),
            ],
        )?;
        if changed == 0 {
            return Err(Error::other(format!("news {} not found", news.id)));
        }
        Ok(())
    }

    fn find_all(&self, page: Page) -> Result<Vec<News>> {
        self.query_news(
            &format!(
                "SELECT {NEWS_COLUMNS} FROM news ORDER BY created_at DESC, rowid DESC \
                 LIMIT ?1 OFFSET ?2"
            ),
            &[&(page.size as i64), &(page.offset() as i64)],
        )
    }

    fn find_by_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<News>> {
        self.query_news(
            &format!(
                "SELECT {NEWS_COLUMNS} FROM news WHERE created_at >= ?1 AND created_at < ?2 \
                 ORDER BY created_at DESC, rowid DESC LIMIT ?3 OFFSET ?4"
            ),
            &[
                &format_ts(&from),
                &format_ts(&to),
                &(page.size as i64),
                &(page.offset() as i64),
            ],
        )
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
        Ok(total as usize)
    }
}

const POST_COLUMNS: &str = "id, title, body, original_language, title_zh, title_en, body_zh, \
     body_en, status, category, tags, author, moderation_result, moderation_confidence, \
     review_note, reviewer, reviewed_at, created_at, updated_at";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let tags: String = row.get(10)?;
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        original_language: row
            .get::<_, String>(3)?
            .parse()
            .unwrap_or(Language::Unknown),
        title_zh: row.get(4)?,
        title_en: row.get(5)?,
        body_zh: row.get(6)?,
        body_en: row.get(7)?,
        status: row
            .get::<_, String>(8)?
            .parse()
            .unwrap_or(PostStatus::PendingReview),
        category: row.get(9)?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        author: row.get(11)?,
        moderation_result: row.get(12)?,
        moderation_confidence: row.get(13)?,
        review_note: row.get(14)?,
        reviewer: row.get(15)?,
        reviewed_at: row.get::<_, Option<String>>(16)?.map(|s| parse_ts(&s)),
        created_at: parse_ts(&row.get::<_, String>(17)?),
        updated_at: parse_ts(&row.get::<_, String>(18)?),
    })
}

/// SQLite implementation of PostRepository
pub struct SqlitePostRepository {
    conn: Mutex<Connection>,
}

impl SqlitePostRepository {
    /// Open (or create) a database file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = Self {
            conn: Mutex::new(open_connection(path)?),
        };
        repo.create_schema()?;

        tracing::info!(path = %path.display(), "SQLite post repository initialized");
        Ok(repo)
    }

    /// Create in-memory repository (for testing)
    pub fn in_memory() -> Result<Self> {
        let repo = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        repo.create_schema()?;
        Ok(repo)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::other("SQLite post connection lock poisoned"))
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
                CREATE TABLE IF NOT EXISTS posts (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    body TEXT NOT NULL,
                    original_language TEXT NOT NULL DEFAULT 'unknown',
                    title_zh TEXT,
                    title_en TEXT,
                    body_zh TEXT,
                    body_en TEXT,
                    status TEXT NOT NULL,
                    category TEXT NOT NULL DEFAULT '',
                    tags TEXT NOT NULL DEFAULT '[]',
                    author TEXT NOT NULL,
                    moderation_result TEXT,
                    moderation_confidence REAL,
                    review_note TEXT,
                    reviewer TEXT,
                    reviewed_at TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_posts_title
                    ON posts(title);

                CREATE INDEX IF NOT EXISTS idx_posts_status
                    ON posts(status, created_at);
                "#,
        )?;
        Ok(())
    }

    fn query_posts(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Post>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, post_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

impl PostRepository for SqlitePostRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let conn = self.lock()?;
        let post = conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id],
                post_from_row,
            )
            .optional()?;
        Ok(post)
    }

    fn find_by_title(&self, title: &str) -> Result<Vec<Post>> {
        self.query_posts(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE title = ?1 ORDER BY created_at"),
            &[&title],
        )
    }

    fn save(&self, post: &Post) -> Result<()> {
        let tags = serde_json::to_string(&post.tags)?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO posts ({POST_COLUMNS}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)"
            ),
            params![
                post.id,
                post.title,
                post.body,
                post.original_language.as_str(),
                post.title_zh,
                post.title_en,
                post.body_zh,
                post.body_en,
                post.status.as_str(),
                post.category,
                tags,
                post.author,
                post.moderation_result,
                post.moderation_confidence,
                post.review_note,
                post.reviewer,
                post.reviewed_at.as_ref().map(format_ts),
                format_ts(&post.created_at),
                format_ts(&post.updated_at),
            ],
        )
        .map_err(|e| match Error::from(e) {
            Error::Duplicate { .. } => Error::duplicate("post", post.id.clone()),
            other => other,
        })?;
        Ok(())
    }

    fn update(&self, post: &Post) -> Result<()> {
        let tags = serde_json::to_string(&post.tags)?;
        let conn = self.lock()?;
        let changed = conn.execute(
            r#"
                UPDATE posts SET title = ?2, body = ?3, original_language = ?4, title_zh = ?5,
                    title_en = ?6, body_zh = ?7, body_en = ?8, status = ?9, category = ?10,
                    tags = ?11, author = ?12, moderation_result = ?13,
                    moderation_confidence = ?14, review_note = ?15, reviewer = ?16,
                    reviewed_at = ?17, updated_at = ?18
                WHERE id = ?1
                "#,
            params![
                post.id,
                post.title,
                post.body,
                post.original_language.as_str(),
                post.title_zh,
                post.title_en,
                post.body_zh,
                post.body_en,
                post.status.as_str(),
                post.category,
                tags,
                post.author,
                post.moderation_result,
                post.moderation_confidence,
                post.review_note,
                post.reviewer,
                post.reviewed_at.as_ref().map(format_ts),
                format_ts(&post.updated_at),
            ],
        )?;
        if changed == 0 {
            return Err(Error::other(format!("post {} not found", post.id)));
        }
        Ok(())
    }

    fn find_by_status(&self, status: PostStatus, page: Page) -> Result<Vec<Post>> {
        self.query_posts(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts WHERE status = ?1 \
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2 OFFSET ?3"
            ),
            &[&status.as_str(), &(page.size as i64), &(page.offset() as i64)],
        )
    }

    fn count_by_status(&self, status: PostStatus) -> Result<usize> {
        let conn = self.lock()?;
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM posts WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(total as usize)
    }

    fn find_all(&self, page: Page) -> Result<Vec<Post>> {
        self.query_posts(
            &format!(
                "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, rowid DESC \
                 LIMIT ?1 OFFSET ?2"
            ),
            &[&(page.size as i64), &(page.offset() as i64)],
        )
    }

    fn delete_by_status(&self, status: PostStatus) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM posts WHERE status = ?1",
            params![status.as_str()],
        )?;
        tracing::info!(status = %status, removed, "Deleted posts by status");
        Ok(removed)
    }
}

// ============================================================================
// In-memory Implementation
// ============================================================================

fn poisoned() -> Error {
    Error::other("in-memory repository lock poisoned")
}

/// Newest first; later insertions win ties
fn newest_first<T: Clone>(items: &[T], created_at: impl Fn(&T) -> DateTime<Utc>, page: Page) -> Vec<T> {
    let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
    sorted.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    sorted
        .into_iter()
        .skip(page.offset())
        .take(page.size)
        .collect()
}

/// In-memory implementation of NewsRepository
///
/// Useful for testing without database dependencies.
#[derive(Default)]
pub struct InMemoryNewsRepository {
    items: RwLock<Vec<News>>,
}

impl InMemoryNewsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of items
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NewsRepository for InMemoryNewsRepository {
    fn find_by_canonical_url(&self, url: &str) -> Result<Option<News>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.iter().find(|n| n.canonical_url == url).cloned())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<News>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.iter().find(|n| n.id == id).cloned())
    }

    fn save(&self, news: &News) -> Result<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        if items
            .iter()
            .any(|n| n.canonical_url == news.canonical_url || n.id == news.id)
        {
            return Err(Error::duplicate("news", news.canonical_url.clone()));
        }
        items.push(news.clone());
        Ok(())
    }

    fn update(&self, news: &News) -> Result<()> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let slot = items
            .iter_mut()
            .find(|n| n.id == news.id)
            .ok_or_else(|| Error::other(format!("news {} not found", news.id)))?;
        let created_at = slot.created_at;
        *slot = News {
            created_at,
            canonical_url: slot.canonical_url.clone(),
            ..news.clone()
        };
        Ok(())
    }

    fn find_all(&self, page: Page) -> Result<Vec<News>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(newest_first(&items, |n| n.created_at, page))
    }

    fn find_by_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<News>> {
        let items = self.items.read().map_err(|_| poisoned())?;
        let in_range: Vec<News> = items
            .iter()
            .filter(|n| n.created_at >= from && n.created_at < to)
            .cloned()
            .collect();
        Ok(newest_first(&in_range, |n| n.created_at, page))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.items.read().map_err(|_| poisoned())?.len())
    }
}

/// In-memory implementation of PostRepository
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of posts
    pub fn len(&self) -> usize {
        self.posts.read().map(|posts| posts.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count posts per status
    pub fn status_histogram(&self) -> HashMap<PostStatus, usize> {
        let mut histogram = HashMap::new();
        if let Ok(posts) = self.posts.read() {
            for post in posts.iter() {
                *histogram.entry(post.status).or_insert(0) += 1;
            }
        }
        histogram
    }
}

impl PostRepository for InMemoryPostRepository {
    fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned())?;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    fn find_by_title(&self, title: &str) -> Result<Vec<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned())?;
        Ok(posts.iter().filter(|p| p.title == title).cloned().collect())
    }

    fn save(&self, post: &Post) -> Result<()> {
        let mut posts = self.posts.write().map_err(|_| poisoned())?;
        if posts.iter().any(|p| p.id == post.id) {
            return Err(Error::duplicate("post", post.id.clone()));
        }
        posts.push(post.clone());
        Ok(())
    }

    fn update(&self, post: &Post) -> Result<()> {
        let mut posts = self.posts.write().map_err(|_| poisoned())?;
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or_else(|| Error::other(format!("post {} not found", post.id)))?;
        let created_at = slot.created_at;
        *slot = Post {
            created_at,
            ..post.clone()
        };
        Ok(())
    }

    fn find_by_status(&self, status: PostStatus, page: Page) -> Result<Vec<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned())?;
        let matching: Vec<Post> = posts.iter().filter(|p| p.status == status).cloned().collect();
        Ok(newest_first(&matching, |p| p.created_at, page))
    }

    fn count_by_status(&self, status: PostStatus) -> Result<usize> {
        let posts = self.posts.read().map_err(|_| poisoned())?;
        Ok(posts.iter().filter(|p| p.status == status).count())
    }

    fn find_all(&self, page: Page) -> Result<Vec<Post>> {
        let posts = self.posts.read().map_err(|_| poisoned())?;
        Ok(newest_first(&posts, |p| p.created_at, page))
    }

    fn delete_by_status(&self, status: PostStatus) -> Result<usize> {
        let mut posts = self.posts.write().map_err(|_| poisoned())?;
        let before = posts.len();
        posts.retain(|p| p.status != status);
        Ok(before - posts.len())
    }
}

// ============================================================================
// Shared Repository Types
// ============================================================================

/// Thread-safe shared news repository
pub type SharedNewsRepository = Arc<dyn NewsRepository>;

/// Thread-safe shared post repository
pub type SharedPostRepository = Arc<dyn PostRepository>;

/// Open both SQLite repositories on the same database file
pub fn create_sqlite_repositories(
    path: impl AsRef<Path>,
) -> Result<(SharedNewsRepository, SharedPostRepository)> {
    let path = path.as_ref();
    let news = SqliteNewsRepository::new(path)?;
    let posts = SqlitePostRepository::new(path)?;
    Ok((Arc::new(news), Arc::new(posts)))
}

/// Create shared in-memory repositories
pub fn create_in_memory_repositories() -> (SharedNewsRepository, SharedPostRepository) {
    (
        Arc::new(InMemoryNewsRepository::new()),
        Arc::new(InMemoryPostRepository::new()),
    )
}

// ============================================================================
// Tests
// ============================================================================
