//! Bookshelf catalog server
//!
//! A REST JSON API for a book catalog. Catalog writes can be gated behind
//! short-lived bearer tokens issued in exchange for a configured credential.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult, AuthError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
