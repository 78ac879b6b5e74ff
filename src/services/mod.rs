//! Business logic services

pub mod auth;
pub mod catalog;
pub mod credentials;
pub mod token;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::BookStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services over the given store.
    /// Fails when the token or credential configuration is unusable.
    pub fn new(store: Arc<dyn BookStore>, config: &AppConfig) -> AppResult<Self> {
        let tokens = token::TokenService::new(&config.auth)?;
        let credentials = credentials::StaticCredentials::from_config(&config.auth)?;

        Ok(Self {
            auth: auth::AuthService::new(Arc::new(credentials), tokens),
            catalog: catalog::CatalogService::new(store, config.catalog.enforce_unique_isbn),
        })
    }
}
