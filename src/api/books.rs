//! Book (catalog) endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppResult, ErrorResponse},
    models::book::{BookInput, BookRecord, BookUpdate},
    AppState,
};

/// Confirmation returned by catalog mutations
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// List all books
#[utoipa::path(
    get,
    path = "/books/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<BookRecord>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<BookRecord>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get a book by ISBN
#[utoipa::path(
    get,
    path = "/books/books/{isbn}",
    tag = "books",
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book details", body = BookRecord),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookRecord>> {
    let book = state.services.catalog.get_book(&isbn).await?;
    Ok(Json(book))
}

/// Add a book
#[utoipa::path(
    post,
    path = "/books/add-book",
    tag = "books",
    security((), ("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book added", body = MessageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 409, description = "ISBN already exists (when uniqueness is enforced)", body = ErrorResponse)
    )
)]
pub async fn add_book(
    State(state): State<AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(book) = payload?;
    state.services.catalog.add_book(book).await?;
    Ok(MessageResponse::new("Book added successfully !"))
}

/// Update title, author and publication year of a book
#[utoipa::path(
    put,
    path = "/books/update-book/{isbn}",
    tag = "books",
    security((), ("bearer_auth" = [])),
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    request_body = BookUpdate,
    responses(
        (status = 200, description = "Book updated", body = MessageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    payload: Result<Json<BookUpdate>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(patch) = payload?;
    state.services.catalog.update_book(&isbn, patch).await?;
    Ok(MessageResponse::new("Book updated successfully!"))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/delete-book/{isbn}",
    tag = "books",
    security((), ("bearer_auth" = [])),
    params(
        ("isbn" = String, Path, description = "Book ISBN")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.services.catalog.delete_book(&isbn).await?;
    Ok(MessageResponse::new("Book deleted successfully!"))
}
