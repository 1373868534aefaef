//! Persistence for news items and community posts
//!
//! A single SQLite file holds both tables. Callers depend on the
//! [`NewsRepository`] and [`PostRepository`] traits, so tests and the dry-run
//! CLI path can swap in the in-memory implementations.

pub mod repository;

pub use repository::{
    create_in_memory_repositories, create_sqlite_repositories, InMemoryNewsRepository,
    InMemoryPostRepository, NewsRepository, PostRepository, SharedNewsRepository,
    SharedPostRepository, SqliteNewsRepository, SqlitePostRepository,
};

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    pub fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }

    /// First page with the given size
    pub fn first(size: usize) -> Self {
        Self::new(0, size)
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> usize {
        self.number.saturating_mul(self.size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}
