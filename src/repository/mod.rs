//! Repository layer for catalog storage

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::book::{BookInput, BookRecord, BookUpdate},
};

pub use books::PgBookStore;
pub use memory::MemoryBookStore;

/// Storage contract for book records.
///
/// Lookups match on `isbn` and return the lowest `id` when several records
/// share it. Mutations resolve the target at execution time, so a record that
/// vanished between a caller's lookup and its mutation yields `None`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All records in ascending `id` order
    async fn list_all(&self) -> AppResult<Vec<BookRecord>>;

    /// First record carrying `isbn`
    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<BookRecord>>;

    /// Persist a new record and return it with its assigned `id`
    async fn insert(&self, book: &BookInput) -> AppResult<BookRecord>;

    /// Persist a new record unless one with the same `isbn` exists
    async fn insert_unique(&self, book: &BookInput) -> AppResult<Option<BookRecord>>;

    /// Overwrite the mutable fields of the first record carrying `isbn`
    async fn update_by_isbn(&self, isbn: &str, patch: &BookUpdate) -> AppResult<Option<BookRecord>>;

    /// Remove the first record carrying `isbn`
    async fn delete_by_isbn(&self, isbn: &str) -> AppResult<Option<BookRecord>>;

    /// Check that the backing medium is reachable
    async fn ping(&self) -> AppResult<()>;
}
