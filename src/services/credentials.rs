//! Credential checks preceding token issuance

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use sha2::{Digest, Sha256};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
};

/// Decides whether a username/password pair may obtain a token.
///
/// The server ships with [`StaticCredentials`]; a credential store can be
/// plugged in by implementing this trait.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialVerifier: Send + Sync {
    fn check_credential(&self, username: &str, password: &str) -> bool;
}

enum Secret {
    /// SHA-256 of the configured plaintext password
    Plain([u8; 32]),
    /// Argon2 PHC string
    Hashed(String),
}

/// A single configured username/password pair
pub struct StaticCredentials {
    username: String,
    secret: Secret,
}

impl StaticCredentials {
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let secret = match (&config.password_hash, &config.password) {
            (Some(phc), _) => {
                PasswordHash::new(phc).map_err(|e| {
                    AppError::Configuration(format!("auth.password_hash is not a valid PHC string: {}", e))
                })?;
                Secret::Hashed(phc.clone())
            }
            (None, Some(password)) => Secret::Plain(digest(password)),
            (None, None) => {
                return Err(AppError::Configuration(
                    "no password configured for the admin account".to_string(),
                ))
            }
        };

        Ok(Self {
            username: config.username.clone(),
            secret,
        })
    }
}

impl CredentialVerifier for StaticCredentials {
    fn check_credential(&self, username: &str, password: &str) -> bool {
        let password_ok = match &self.secret {
            Secret::Plain(expected) => digest(password) == *expected,
            Secret::Hashed(phc) => PasswordHash::new(phc)
                .map(|hash| Argon2::default().verify_password(password.as_bytes(), &hash).is_ok())
                .unwrap_or(false),
        };
        // Evaluate both so a wrong username costs the same as a wrong password
        let username_ok = digest(username) == digest(&self.username);

        username_ok && password_ok
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
