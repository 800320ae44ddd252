//! Account storage.
//!
//! Username/password accounts with Argon2-hashed passwords. Lookups are by
//! exact username; backends that talk to a database must bind the username
//! as a query parameter rather than formatting it into SQL.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;
use tracing::debug;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password;

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique username.
    pub username: String,

    /// Contact email.
    pub email: String,

    /// Argon2 PHC hash of the password.
    pub password_hash: String,

    /// When the account was created.
    pub created_at: OffsetDateTime,
}

/// Storage operations for accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>>;

    /// Create an account, hashing `password`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The username, password or email is empty
    /// - An account with the same username already exists
    /// - The storage operation fails
    async fn create_account(&self, username: &str, password: &str, email: &str)
    -> AuthResult<Account>;

    /// Check a password for `username`.
    ///
    /// Returns `false` both for unknown users and wrong passwords.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or the stored hash is
    /// unreadable.
    async fn verify_password(&self, username: &str, password: &str) -> AuthResult<bool> {
        let Some(account) = self.find_by_username(username).await? else {
            debug!(username = %username, "Password check for unknown account");
            return Ok(false);
        };

        password::verify_password(password, &account.password_hash)
            .map_err(|e| AuthError::storage(format!("Unreadable password hash: {e}")))
    }
}

/// Account store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: DashMap<String, Account>,
}

impl InMemoryAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns `true` if there are no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Account>> {
        Ok(self.accounts.get(username).map(|entry| entry.value().clone()))
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> AuthResult<Account> {
        if username.trim().is_empty() {
            return Err(AuthError::invalid_request("username must not be empty"));
        }
        if password.is_empty() {
            return Err(AuthError::invalid_request("password must not be empty"));
        }
        if email.trim().is_empty() {
            return Err(AuthError::invalid_request("email must not be empty"));
        }

        let password_hash = password::hash_password(password)
            .map_err(|e| AuthError::internal(format!("Failed to hash password: {e}")))?;

        match self.accounts.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AuthError::invalid_request(format!(
                "account '{username}' already exists"
            ))),
            Entry::Vacant(slot) => {
                let account = Account {
                    username: username.to_string(),
                    email: email.to_string(),
                    password_hash,
                    created_at: OffsetDateTime::now_utc(),
                };
                slot.insert(account.clone());
                debug!(username = %username, "Account created");
                Ok(account)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryAccountStore::new();
        let account = store
            .create_account("dario", "Th3Qu1ckBr0wnF0x", "dario@example.com")
            .await
            .unwrap();

        assert_eq!(account.username, "dario");
        assert!(account.password_hash.starts_with("$argon2id$"));
        assert_ne!(account.password_hash, "Th3Qu1ckBr0wnF0x");

        let found = store.find_by_username("dario").await.unwrap().unwrap();
        assert_eq!(found, account);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_verify_password() {
        let store = InMemoryAccountStore::new();
        store
            .create_account("dario", "Th3Qu1ckBr0wnF0x", "dario@example.com")
            .await
            .unwrap();

        assert!(store.verify_password("dario", "Th3Qu1ckBr0wnF0x").await.unwrap());
        assert!(!store.verify_password("dario", "wrong").await.unwrap());
        assert!(!store.verify_password("ghost", "Th3Qu1ckBr0wnF0x").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryAccountStore::new();
        store.create_account("dario", "one", "a@example.com").await.unwrap();

        let err = store
            .create_account("dario", "two", "b@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));

        // Original password still works.
        assert!(store.verify_password("dario", "one").await.unwrap());
    }

    #[tokio::test]
    async fn test_username_is_data_not_query() {
        let store = InMemoryAccountStore::new();
        store.create_account("dario", "pw", "d@example.com").await.unwrap();

        let injected = "dario' OR '1'='1";
        assert!(store.find_by_username(injected).await.unwrap().is_none());
        assert!(!store.verify_password(injected, "pw").await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let store = InMemoryAccountStore::new();
        assert!(store.create_account("", "pw", "e@example.com").await.is_err());
        assert!(store.create_account("u", "", "e@example.com").await.is_err());
        assert!(store.create_account("u", "pw", " ").await.is_err());
        assert!(store.is_empty());
    }
}
