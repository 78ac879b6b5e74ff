//! API handlers for Bookshelf REST endpoints

pub mod books;
pub mod health;
pub mod login;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Enforcement,
    error::{AppError, AuthError},
    models::token::TokenClaims,
    AppState,
};

/// Extractor for the caller's validated bearer token
pub struct AuthenticatedUser(pub TokenClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingCredentials)?;

        let claims = state.services.auth.verify(bearer.token())?;
        Ok(AuthenticatedUser(claims))
    }
}

/// Reject requests that do not carry a valid bearer token
async fn require_bearer(
    AuthenticatedUser(claims): AuthenticatedUser,
    request: Request,
    next: Next,
) -> Response {
    tracing::debug!(subject = %claims.sub, token_id = %claims.jti, "Bearer token accepted");
    next.run(request).await
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let reads = Router::new()
        .route("/books", get(books::list_books))
        .route("/books/:isbn", get(books::get_book));

    let writes = Router::new()
        .route("/add-book", post(books::add_book))
        .route("/update-book/:isbn", put(books::update_book))
        .route("/delete-book/:isbn", delete(books::delete_book));

    let guard = middleware::from_fn_with_state(state.clone(), require_bearer);
    let enforcement = state.config.auth.enforcement;
    tracing::info!(?enforcement, "Catalog authorization mode");

    let books = match enforcement {
        Enforcement::Disabled => reads.merge(writes),
        Enforcement::Writes => reads.merge(writes.route_layer(guard)),
        Enforcement::All => reads.merge(writes).route_layer(guard),
    };

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/login/authenticate", post(login::authenticate))
        .route("/login/me", get(login::me))
        // Catalog
        .nest("/books", books)
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
