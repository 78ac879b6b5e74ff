//! Authentication: credential check followed by token issuance

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult, AuthError},
    models::token::{AccessToken, TokenClaims},
    services::{credentials::CredentialVerifier, token::TokenService},
};

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialVerifier>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialVerifier>, tokens: TokenService) -> Self {
        Self { credentials, tokens }
    }

    /// Check the credential pair and issue a token for `username` on success
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<AccessToken> {
        let credentials = self.credentials.clone();
        let (user, pass) = (username.to_string(), password.to_string());

        // Hash verification is CPU-bound
        let accepted = tokio::task::spawn_blocking(move || credentials.check_credential(&user, &pass))
            .await
            .map_err(|e| AppError::Internal(format!("Credential check panicked: {}", e)))?;

        if !accepted {
            // Surfaced at warn by the error response
            tracing::debug!(username, "Rejected login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }

        let token = self.tokens.issue(username)?;
        tracing::info!(username, token_id = %token.token_id, "User authenticated");
        Ok(token)
    }

    /// Validate a bearer token
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        self.tokens.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{http::StatusCode, response::IntoResponse};
    use tracing_subscriber::{
        layer::{Context, SubscriberExt},
        Layer,
    };

    use super::*;
    use crate::{
        config::AuthConfig,
        services::credentials::{MockCredentialVerifier, StaticCredentials},
    };

    fn tokens() -> TokenService {
        TokenService::new(&AuthConfig {
            signing_key: "0123456789abcdef0123456789abcdef".to_string(),
            ..AuthConfig::default()
        })
        .unwrap()
    }

    fn service() -> AuthService {
        let credentials = StaticCredentials::from_config(&AuthConfig::default()).unwrap();
        AuthService::new(Arc::new(credentials), tokens())
    }

    #[tokio::test]
    async fn test_authenticate_admin_round_trips() {
        let auth = service();
        let token = auth.authenticate("admin", "admin@123").await.unwrap();
        assert_eq!(token.subject, "admin");

        let claims = auth.verify(&token.token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.jti, token.token_id);
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let result = service().authenticate("admin", "wrong").await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidCredentials))));
    }

    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_rejected_login_warns_once() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let err = service().authenticate("admin", "wrong").await.unwrap_err();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pluggable_verifier_is_consulted() {
        let mut verifier = MockCredentialVerifier::new();
        verifier
            .expect_check_credential()
            .withf(|username, password| username == "librarian" && password == "shelves")
            .times(1)
            .return_const(true);

        let auth = AuthService::new(Arc::new(verifier), tokens());
        let token = auth.authenticate("librarian", "shelves").await.unwrap();
        assert_eq!(tokens().validate(&token.token).unwrap(), "librarian");
    }
}
