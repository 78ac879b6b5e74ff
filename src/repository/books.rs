//! PostgreSQL-backed book store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::BookStore;
use crate::{
    error::AppResult,
    models::book::{BookInput, BookRecord, BookUpdate},
};

const BOOK_COLUMNS: &str = "id, isbn, title, author, publication_year";

#[derive(Clone)]
pub struct PgBookStore {
    pool: Pool<Postgres>,
}

impl PgBookStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    async fn list_all(&self) -> AppResult<Vec<BookRecord>> {
        let query = format!("SELECT {} FROM books ORDER BY id", BOOK_COLUMNS);
        let rows = sqlx::query_as::<_, BookRecord>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_isbn(&self, isbn: &str) -> AppResult<Option<BookRecord>> {
        let query = format!(
            "SELECT {} FROM books WHERE isbn = $1 ORDER BY id LIMIT 1",
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRecord>(&query)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, book: &BookInput) -> AppResult<BookRecord> {
        let query = format!(
            r#"
            INSERT INTO books (isbn, title, author, publication_year)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRecord>(&query)
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.publication_year)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_unique(&self, book: &BookInput) -> AppResult<Option<BookRecord>> {
        let mut tx = self.pool.begin().await?;

        // Serializes checked inserts of the same isbn until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&book.isbn)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            r#"
            INSERT INTO books (isbn, title, author, publication_year)
            SELECT $1::text, $2::text, $3::text, $4::integer
            WHERE NOT EXISTS (SELECT 1 FROM books WHERE isbn = $1::text)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRecord>(&query)
            .bind(&book.isbn)
            .bind(&book.title)
            .bind(&book.author)
            .bind(book.publication_year)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn update_by_isbn(&self, isbn: &str, patch: &BookUpdate) -> AppResult<Option<BookRecord>> {
        let query = format!(
            r#"
            UPDATE books
            SET title = $2, author = $3, publication_year = $4
            WHERE id = (SELECT id FROM books WHERE isbn = $1 ORDER BY id LIMIT 1)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRecord>(&query)
            .bind(isbn)
            .bind(&patch.title)
            .bind(&patch.author)
            .bind(patch.publication_year)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_isbn(&self, isbn: &str) -> AppResult<Option<BookRecord>> {
        let query = format!(
            r#"
            DELETE FROM books
            WHERE id = (SELECT id FROM books WHERE isbn = $1 ORDER BY id LIMIT 1)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let row = sqlx::query_as::<_, BookRecord>(&query)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
