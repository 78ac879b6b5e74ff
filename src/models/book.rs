//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Earliest publication year accepted by the catalog (four digits)
pub const MIN_PUBLICATION_YEAR: i32 = 1000;
/// Latest publication year accepted by the catalog (four digits)
pub const MAX_PUBLICATION_YEAR: i32 = 9999;

/// A stored catalog entry.
///
/// `id` is assigned by the store on creation and never changes or gets reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Store-assigned identifier
    pub id: i32,
    /// Business identifier, not guaranteed unique
    pub isbn: String,
    pub title: String,
    pub author: String,
    /// Four-digit publication year
    pub publication_year: i32,
}

/// Payload for adding a book.
///
/// Missing fields deserialize to empty values so that they are reported by
/// validation rather than by the JSON decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "ISBN is required"))]
    pub isbn: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Author is required"))]
    pub author: String,
    #[serde(default)]
    #[validate(range(
        min = 1000,
        max = 9999,
        message = "Please enter a valid year in YYYY format"
    ))]
    pub publication_year: i32,
}

/// Mutable fields of a book. An `isbn` sent alongside is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Author is required"))]
    pub author: String,
    #[serde(default)]
    #[validate(range(
        min = 1000,
        max = 9999,
        message = "Please enter a valid year in YYYY format"
    ))]
    pub publication_year: i32,
}

impl BookRecord {
    /// Overwrite the mutable fields, leaving `id` and `isbn` untouched.
    pub fn apply(&mut self, patch: &BookUpdate) {
        self.title = patch.title.clone();
        self.author = patch.author.clone();
        self.publication_year = patch.publication_year;
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}
