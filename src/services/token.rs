//! Access token issuance and validation
//!
//! Tokens are HS256-signed JWTs. The signing key and issuer are read once at
//! construction and never change afterwards, so a `TokenService` can be
//! shared freely between requests.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult, AuthError},
    models::token::{AccessToken, TokenClaims},
};

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: Option<String>,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        if config.issuer.trim().is_empty() {
            return Err(AppError::Configuration("token issuer is not configured".to_string()));
        }
        if config.signing_key.is_empty() {
            return Err(AppError::Configuration("token signing key is not configured".to_string()));
        }

        let lifetime = Duration::try_minutes(config.token_lifetime_minutes)
            .filter(|lifetime| *lifetime > Duration::zero())
            .ok_or_else(|| AppError::Configuration("token lifetime is out of range".to_string()))?;

        let secret = config.signing_key.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime,
        })
    }

    /// Issue a token for `subject`, valid from now for the configured lifetime
    pub fn issue(&self, subject: &str) -> AppResult<AccessToken> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> AppResult<AccessToken> {
        let iat = now.timestamp();
        let exp = iat + self.lifetime.num_seconds();
        let claims = TokenClaims {
            sub: subject.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            name: subject.to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Configuration(format!("Failed to sign token: {}", e)))?;

        let issued_at = DateTime::from_timestamp(iat, 0)
            .ok_or_else(|| AppError::Internal("Token issue time out of range".to_string()))?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?;

        tracing::debug!(subject, token_id = %claims.jti, %expires_at, "Issued access token");

        Ok(AccessToken {
            token,
            subject: claims.sub,
            token_id: claims.jti,
            issued_at,
            expires_at,
        })
    }

    /// Validate a token and return its subject
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.verify(token).map(|claims| claims.sub)
    }

    /// Validate a token and return its full claim set
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate a token as of `now`. The token is accepted on `[iat, exp)`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation())
            .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        let now = now.timestamp();
        if now >= claims.exp {
            return Err(AuthError::Expired);
        }
        if now < claims.iat {
            return Err(AuthError::NotYetValid);
        }

        Ok(claims)
    }

    // Expiry is checked by `verify_at` against the caller's clock, not here.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience.as_str()]),
            None => validation.validate_aud = false,
        }
        validation
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::ImmatureSignature => AuthError::NotYetValid,
        _ => AuthError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    fn config() -> AuthConfig {
        AuthConfig {
            signing_key: KEY.to_string(),
            ..AuthConfig::default()
        }
    }

    fn service() -> TokenService {
        TokenService::new(&config()).unwrap()
    }

    #[test]
    fn test_issue_then_validate_returns_subject() {
        let tokens = service();
        let issued = tokens.issue("admin").unwrap();
        assert_eq!(tokens.validate(&issued.token).unwrap(), "admin");
    }

    #[test]
    fn test_lifetime_is_sixty_minutes() {
        let issued = service().issue("admin").unwrap();
        assert_eq!(issued.expires_at - issued.issued_at, Duration::minutes(60));
    }

    #[test]
    fn test_token_ids_are_unique_per_issuance() {
        let tokens = service();
        let first = tokens.issue("admin").unwrap();
        let second = tokens.issue("admin").unwrap();
        assert_ne!(first.token_id, second.token_id);
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_token_expires_at_exp() {
        let tokens = service();
        let issued_at = Utc::now();
        let issued = tokens.issue_at("admin", issued_at).unwrap();

        let just_before = issued.expires_at - Duration::seconds(1);
        assert!(tokens.verify_at(&issued.token, just_before).is_ok());
        assert_eq!(
            tokens.verify_at(&issued.token, issued.expires_at),
            Err(AuthError::Expired)
        );
        assert_eq!(
            tokens.verify_at(&issued.token, issued.expires_at + Duration::hours(1)),
            Err(AuthError::Expired)
        );
    }

    #[test]
    fn test_token_issued_in_the_past_is_expired() {
        let tokens = service();
        let issued = tokens
            .issue_at("admin", Utc::now() - Duration::minutes(61))
            .unwrap();
        assert_eq!(tokens.validate(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn test_token_is_not_valid_before_issue() {
        let tokens = service();
        let issued = tokens.issue("admin").unwrap();
        assert_eq!(
            tokens.verify_at(&issued.token, issued.issued_at - Duration::seconds(5)),
            Err(AuthError::NotYetValid)
        );
    }

    #[test]
    fn test_flipped_signature_bit_is_rejected() {
        let tokens = service();
        let issued = tokens.issue("admin").unwrap();

        let (signed, signature) = issued.token.rsplit_once('.').unwrap();
        let mut bytes = URL_SAFE_NO_PAD.decode(signature).unwrap();
        for bit in [0u8, 3, 7] {
            bytes[0] ^= 1 << bit;
            let tampered = format!("{}.{}", signed, URL_SAFE_NO_PAD.encode(&bytes));
            assert_eq!(tokens.validate(&tampered), Err(AuthError::InvalidSignature));
            bytes[0] ^= 1 << bit;
        }
    }

    #[test]
    fn test_tampered_claims_are_rejected() {
        let tokens = service();
        let issued = tokens.issue("reader").unwrap();
        let mut parts: Vec<&str> = issued.token.split('.').collect();

        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims["sub"] = serde_json::json!("admin");
        let forged = URL_SAFE_NO_PAD.encode(claims.to_string());
        parts[1] = &forged;

        assert_eq!(tokens.validate(&parts.join(".")), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_token_from_other_key_is_rejected() {
        let other = TokenService::new(&AuthConfig {
            signing_key: "another-key-another-key-another-key".to_string(),
            ..AuthConfig::default()
        })
        .unwrap();
        let issued = other.issue("admin").unwrap();
        assert_eq!(service().validate(&issued.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_token_from_other_issuer_is_rejected() {
        let other = TokenService::new(&AuthConfig {
            issuer: "someone-else".to_string(),
            ..config()
        })
        .unwrap();
        let issued = other.issue("admin").unwrap();
        assert_eq!(service().validate(&issued.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_audience_is_enforced_when_configured() {
        let tokens = TokenService::new(&AuthConfig {
            audience: Some("bookshelf-clients".to_string()),
            ..config()
        })
        .unwrap();
        let issued = tokens.issue("admin").unwrap();
        assert_eq!(tokens.validate(&issued.token).unwrap(), "admin");

        let other = TokenService::new(&AuthConfig {
            audience: Some("somewhere-else".to_string()),
            ..config()
        })
        .unwrap();
        assert_eq!(other.validate(&issued.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tokens = service();
        for garbage in ["", "not-a-token", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30"] {
            assert_eq!(tokens.validate(garbage), Err(AuthError::Malformed), "{}", garbage);
        }
    }

    #[test]
    fn test_missing_key_is_a_configuration_error() {
        let result = TokenService::new(&AuthConfig::default());
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }
}
