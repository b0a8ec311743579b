//! Account registration, login and token verification.

use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenIssuer, VerifiedToken};
use crate::db::{CredentialStore, StoreError};
use crate::error::{AppError, AppResult, ErrorPolicy};
use crate::models::Account;
use tracing::{debug, info, warn};
use validator::ValidateEmail;

// Verified against when the username is unknown, so both login failures cost one hash.
const DUMMY_PASSWORD: &str = "credentials-timing-equalizer";

/// Owns hashing, verification and token issuance over an injected [`CredentialStore`].
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    policy: ErrorPolicy,
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// Hashes one dummy password up front with `hasher`'s cost.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
    ) -> AppResult<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            tokens,
            policy: ErrorPolicy::default(),
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Create an account with role `user`. Issues no token.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> AppResult<()> {
        validate_registration(username, password, email)?;

        let password_hash = self.hash_blocking(password).await?;
        let account = Account::new(username, email, password_hash);

        match self.store.insert(account).await {
            Ok(account) => {
                info!(username = %account.username, role = %account.role, "account registered");
                Ok(())
            }
            Err(StoreError::DuplicateKey(field)) => {
                debug!(username = %username, field, "registration rejected: duplicate");
                Err(AppError::AccountExists(field.to_string()))
            }
            Err(StoreError::Backend(e)) => {
                warn!(error = %e, "registration failed: store");
                Err(AppError::StoreUnavailable(e))
            }
        }
    }

    /// Check credentials and return a signed access token.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<String> {
        let account = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| {
                warn!(error = %e, "login failed: store");
                AppError::StoreUnavailable(e.to_string())
            })?;

        let Some(account) = account else {
            self.verify_blocking(password, self.dummy_hash.to_string())
                .await?;
            debug!(username = %username, "login rejected: unknown user");
            return Err(AppError::UserNotFound);
        };

        if !self
            .verify_blocking(password, account.password_hash.clone())
            .await?
        {
            debug!(username = %username, "login rejected: password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&account.username, account.role)?;
        info!(username = %account.username, "login succeeded");
        Ok(token)
    }

    /// Validate a token issued by this service. No store access.
    pub fn verify(&self, token: &str) -> AppResult<VerifiedToken> {
        self.tokens.verify(token)
    }

    async fn hash_blocking(&self, password: &str) -> AppResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash task: {}", e)))?
    }

    async fn verify_blocking(&self, password: &str, hash: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("verify task: {}", e)))?
    }
}

fn validate_registration(username: &str, password: &str, email: &str) -> AppResult<()> {
    for (field, value) in [("username", username), ("password", password), ("email", email)] {
        if value.trim().is_empty() {
            return Err(AppError::InvalidInput(format!("{} is required", field)));
        }
    }
    if !email.validate_email() {
        return Err(AppError::InvalidInput("Invalid email".to_string()));
    }
    Ok(())
}
