//! Access token claims and issued tokens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claim set signed into every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Authenticated principal
    pub sub: String,
    /// Unique per issuance
    pub jti: String,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Display name of the principal
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued token together with the facts it encodes
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Compact wire form handed to the caller
    pub token: String,
    pub subject: String,
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Public view of a validated token
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenInfo {
    pub subject: String,
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn from_claims(claims: &TokenClaims) -> Option<Self> {
        Some(Self {
            subject: claims.sub.clone(),
            token_id: claims.jti.clone(),
            issued_at: DateTime::from_timestamp(claims.iat, 0)?,
            expires_at: DateTime::from_timestamp(claims.exp, 0)?,
        })
    }
}
