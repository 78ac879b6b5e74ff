//! Authentication endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult, ErrorResponse},
    models::token::TokenInfo,
    AppState,
};

use super::AuthenticatedUser;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token
    pub token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Exchange a username and password for an access token
#[utoipa::path(
    post,
    path = "/login/authenticate",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Token signing is misconfigured", body = ErrorResponse)
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(request) = payload?;

    let token = state
        .services
        .auth
        .authenticate(&request.username, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: token.token,
        token_type: "Bearer".to_string(),
        expires_at: token.expires_at,
    }))
}

/// Describe the presented bearer token
#[utoipa::path(
    get,
    path = "/login/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = TokenInfo),
        (status = 401, description = "Token is missing, invalid or expired", body = ErrorResponse)
    )
)]
pub async fn me(AuthenticatedUser(claims): AuthenticatedUser) -> AppResult<Json<TokenInfo>> {
    let info = TokenInfo::from_claims(&claims)
        .ok_or_else(|| AppError::Internal("Token timestamps out of range".to_string()))?;
    Ok(Json(info))
}
