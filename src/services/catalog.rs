//! Catalog management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookInput, BookRecord, BookUpdate},
    repository::BookStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
    enforce_unique_isbn: bool,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>, enforce_unique_isbn: bool) -> Self {
        Self {
            store,
            enforce_unique_isbn,
        }
    }

    /// List every book in the catalog
    pub async fn list_books(&self) -> AppResult<Vec<BookRecord>> {
        self.store.list_all().await
    }

    /// Find a book by ISBN, if any
    pub async fn find_book(&self, isbn: &str) -> AppResult<Option<BookRecord>> {
        self.store.find_by_isbn(isbn).await
    }

    /// Get a book by ISBN
    pub async fn get_book(&self, isbn: &str) -> AppResult<BookRecord> {
        self.find_book(isbn).await?.ok_or_else(|| not_found(isbn))
    }

    /// Validate and store a new book.
    /// Duplicate ISBNs are accepted unless uniqueness is enforced by configuration.
    pub async fn add_book(&self, book: BookInput) -> AppResult<BookRecord> {
        book.validate()?;

        let created = if self.enforce_unique_isbn {
            self.store.insert_unique(&book).await?.ok_or_else(|| {
                AppError::Conflict(format!("A book with ISBN {} already exists", book.isbn))
            })?
        } else {
            self.store.insert(&book).await?
        };

        tracing::info!(id = created.id, isbn = %created.isbn, "Book added");
        Ok(created)
    }

    /// Update title, author and publication year of an existing book
    pub async fn update_book(&self, isbn: &str, patch: BookUpdate) -> AppResult<BookRecord> {
        patch.validate()?;

        let updated = self
            .store
            .update_by_isbn(isbn, &patch)
            .await?
            .ok_or_else(|| not_found(isbn))?;

        tracing::info!(id = updated.id, isbn, "Book updated");
        Ok(updated)
    }

    /// Delete a book
    pub async fn delete_book(&self, isbn: &str) -> AppResult<BookRecord> {
        let deleted = self
            .store
            .delete_by_isbn(isbn)
            .await?
            .ok_or_else(|| not_found(isbn))?;

        tracing::info!(id = deleted.id, isbn, "Book deleted");
        Ok(deleted)
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

fn not_found(isbn: &str) -> AppError {
    AppError::NotFound(format!("Book with ISBN {} not found", isbn))
}
