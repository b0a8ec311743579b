//! Credential store: the account-record boundary, with PostgreSQL and in-memory backends.

mod memory;
mod pool;
mod repositories;

pub use memory::InMemoryCredentialStore;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::PgCredentialStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Account;

/// Raw store failures. Callers translate these into [`crate::AppError`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the insert; carries the column name.
    #[error("duplicate key: {0}")]
    DuplicateKey(&'static str),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Account persistence. Implementations enforce username/email uniqueness atomically.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new account, or fail with `DuplicateKey` if its username or email is taken.
    async fn insert(&self, account: Account) -> Result<Account, StoreError>;

    /// Look up an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;
}
