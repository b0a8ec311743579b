//! In-process credential store for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError};
use crate::models::Account;

#[derive(Default)]
struct Accounts {
    by_username: HashMap<String, Account>,
    // email -> username
    emails: HashMap<String, String>,
}

/// Accounts held in memory. Check-and-insert happens under one write lock.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    inner: Arc<RwLock<Accounts>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_username.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, account: Account) -> Result<Account, StoreError> {
        let mut accounts = self.inner.write().await;
        if accounts.by_username.contains_key(&account.username) {
            return Err(StoreError::DuplicateKey("username"));
        }
        if accounts.emails.contains_key(&account.email) {
            return Err(StoreError::DuplicateKey("email"));
        }
        accounts
            .emails
            .insert(account.email.clone(), account.username.clone());
        accounts
            .by_username
            .insert(account.username.clone(), account.clone());
        Ok(account)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.read().await.by_username.get(username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str, email: &str) -> Account {
        Account::new(username, email, "$argon2id$stub".to_string())
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryCredentialStore::new();
        let stored = store.insert(account("alice", "a@x.com")).await.unwrap();
        let found = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_duplicate_username_and_email() {
        let store = InMemoryCredentialStore::new();
        store.insert(account("alice", "a@x.com")).await.unwrap();

        let err = store.insert(account("alice", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey("username")));

        let err = store.insert(account("bob", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey("email")));

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_keep_one() {
        let store = InMemoryCredentialStore::new();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(account("alice", &format!("a{}@x.com", i)))
                    .await
            }));
        }
        let mut ok = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(store.len().await, 1);
    }
}
