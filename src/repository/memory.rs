//! Thread-safe in-process book store for development and tests.
//!
//! Records live only as long as the process; use the PostgreSQL store when
//! writes must survive a restart.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::BookStore;
use crate::{
    error::AppResult,
    models::book::{BookInput, BookRecord, BookUpdate},
};

#[derive(Debug, Default)]
struct Shelf {
    books: Vec<BookRecord>,
    last_id: i32,
}

impl Shelf {
    fn position(&self, isbn: &str) -> Option<usize> {
        self.books.iter().position(|book| book.isbn == isbn)
    }

    fn push(&mut self, book: &BookInput) -> BookRecord {
        self.last_id += 1;
        let record = BookRecord {
            id: self.last_id,
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            publication_year: book.publication_year,
        };
        self.books.push(record.clone());
        record
    }
}

/// Records are kept in `id` order, so the first positional match is the
/// lowest `id` for an isbn.
#[derive(Clone, Debug, Default)]
pub struct MemoryBookStore(Arc<RwLock<Shelf>>);

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn list_all(&self) -> AppResult<Vec<BookRecord>> {
        Ok(self.0.read().books.clone())
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<BookRecord>> {
        let shelf = self.0.read();
        Ok(shelf.position(isbn).map(|idx| shelf.books[idx].clone()))
    }

    async fn insert(&self, book: &BookInput) -> AppResult<BookRecord> {
        Ok(self.0.write().push(book))
    }

    async fn insert_unique(&self, book: &BookInput) -> AppResult<Option<BookRecord>> {
        let mut shelf = self.0.write();
        if shelf.position(&book.isbn).is_some() {
            return Ok(None);
        }
        Ok(Some(shelf.push(book)))
    }

    async fn update_by_isbn(&self, isbn: &str, patch: &BookUpdate) -> AppResult<Option<BookRecord>> {
        let mut shelf = self.0.write();
        let Some(idx) = shelf.position(isbn) else {
            return Ok(None);
        };
        let record = &mut shelf.books[idx];
        record.apply(patch);
        Ok(Some(record.clone()))
    }

    async fn delete_by_isbn(&self, isbn: &str) -> AppResult<Option<BookRecord>> {
        let mut shelf = self.0.write();
        Ok(shelf.position(isbn).map(|idx| shelf.books.remove(idx)))
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn book(isbn: &str, title: &str) -> BookInput {
        BookInput {
            isbn: isbn.to_string(),
            title: title.to_string(),
            author: "A".to_string(),
            publication_year: 2021,
        }
    }

    #[tokio::test]
    async fn test_ids_are_never_reused() {
        let store = MemoryBookStore::new();
        let first = store.insert(&book("1", "one")).await.unwrap();
        store.delete_by_isbn("1").await.unwrap();
        let second = store.insert(&book("1", "one again")).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_duplicate_isbn_returns_lowest_id() {
        let store = MemoryBookStore::new();
        let first = store.insert(&book("dup", "first")).await.unwrap();
        store.insert(&book("dup", "second")).await.unwrap();

        let found = store.find_by_isbn("dup").await.unwrap().unwrap();
        assert_eq!(found, first);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_unique_refuses_existing_isbn() {
        let store = MemoryBookStore::new();
        assert!(store.insert_unique(&book("1", "one")).await.unwrap().is_some());
        assert!(store.insert_unique(&book("1", "two")).await.unwrap().is_none());
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_on_missing_isbn_return_none() {
        let store = MemoryBookStore::new();
        let patch = BookUpdate {
            title: "T".to_string(),
            author: "A".to_string(),
            publication_year: 2000,
        };
        assert!(store.update_by_isbn("nope", &patch).await.unwrap().is_none());
        assert!(store.delete_by_isbn("nope").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let store = MemoryBookStore::new();
        let mut handles = Vec::new();
        for n in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert(&book(&n.to_string(), "t")).await.unwrap().id
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 64);
    }
}
