//! Data models for Bookshelf

pub mod book;
pub mod token;

// Re-export commonly used types
pub use book::{BookInput, BookRecord, BookUpdate};
pub use token::{AccessToken, TokenClaims, TokenInfo};
