use crate::api::error::{AppError, AppResult};
use crate::config::ClientConfig;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub username: String,
    pub authenticated_at: DateTime<Utc>,
}

/// Credential check behind the login screen.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<Operator>;
}

/// Verifies the single operator account configured through
/// `CATALOG_ADMIN_USERNAME` and `CATALOG_ADMIN_PASSWORD_HASH`.
pub struct ConfiguredAuthenticator {
    username: Option<String>,
    password_hash: Option<String>,
}

impl ConfiguredAuthenticator {
    pub fn new(username: Option<String>, password_hash: Option<String>) -> Self {
        Self {
            username,
            password_hash,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.admin_username.clone(),
            config.admin_password_hash.clone(),
        )
    }

    fn invalid() -> AppError {
        AppError::Unauthorized("Invalid credentials".to_string())
    }
}

#[async_trait]
impl Authenticator for ConfiguredAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<Operator> {
        let (Some(expected_user), Some(stored_hash)) = (&self.username, &self.password_hash) else {
            tracing::warn!("Login attempted but no operator account is configured");
            return Err(Self::invalid());
        };

        if username != expected_user {
            return Err(Self::invalid());
        }

        let parsed_hash = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::Config(format!("invalid password hash: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| Self::invalid())?;

        Ok(Operator {
            username: username.to_string(),
            authenticated_at: Utc::now(),
        })
    }
}

/// Authentication state for one application run.
///
/// Created unauthenticated at startup, set by a successful login and
/// cleared by logout. The route guard reads it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    operator: Option<Operator>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.operator.is_some()
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub async fn login(
        &mut self,
        authenticator: &dyn Authenticator,
        username: &str,
        password: &str,
    ) -> AppResult<()> {
        match authenticator.authenticate(username, password).await {
            Ok(operator) => {
                tracing::info!("Operator '{}' logged in", operator.username);
                self.operator = Some(operator);
                Ok(())
            }
            Err(e) => {
                self.operator = None;
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Some(operator) = self.operator.take() {
            tracing::info!("Operator '{}' logged out", operator.username);
        }
    }
}
