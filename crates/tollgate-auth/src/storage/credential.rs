//! Client credential storage.
//!
//! Defines the lookup interface the authenticator needs and an in-memory
//! implementation backed by `DashMap`.

use std::fmt;

use async_trait::async_trait;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::AuthResult;
use crate::error::AuthError;
use crate::password;

// =============================================================================
// Client Credential
// =============================================================================

/// A stored client secret.
#[derive(Clone, PartialEq, Eq)]
pub enum ClientSecret {
    /// Secret kept as given. Compared in constant time.
    Plain(String),
    /// Argon2 PHC hash of the secret.
    Argon2(String),
}

impl ClientSecret {
    /// Wraps a plain secret.
    #[must_use]
    pub fn plain(secret: impl Into<String>) -> Self {
        Self::Plain(secret.into())
    }

    /// Wraps an Argon2 PHC hash.
    ///
    /// # Errors
    /// Returns `Configuration` if `hash` is not an Argon2 PHC string.
    pub fn argon2(hash: impl Into<String>) -> AuthResult<Self> {
        let hash = hash.into();
        if !password::is_argon2_hash(&hash) {
            return Err(AuthError::configuration(
                "client secret hash is not an Argon2 PHC string",
            ));
        }
        Ok(Self::Argon2(hash))
    }

    /// Hashes `secret` with Argon2id.
    ///
    /// # Errors
    /// Returns `Internal` if hashing fails.
    pub fn hash(secret: &str) -> AuthResult<Self> {
        password::hash_password(secret)
            .map(Self::Argon2)
            .map_err(|e| AuthError::internal(format!("Failed to hash client secret: {e}")))
    }

    /// Checks a presented secret against this one.
    ///
    /// # Errors
    /// Returns `Storage` if a stored hash cannot be parsed.
    pub fn verify(&self, presented: &str) -> AuthResult<bool> {
        match self {
            Self::Plain(expected) => {
                // Hash both sides so the comparison length does not depend on
                // the stored secret.
                let expected = Sha256::digest(expected.as_bytes());
                let presented = Sha256::digest(presented.as_bytes());
                Ok(expected.as_slice().ct_eq(presented.as_slice()).into())
            }
            Self::Argon2(hash) => password::verify_password(presented, hash)
                .map_err(|e| AuthError::storage(format!("Unreadable client secret hash: {e}"))),
        }
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("ClientSecret::Plain(<redacted>)"),
            Self::Argon2(_) => f.write_str("ClientSecret::Argon2(<redacted>)"),
        }
    }
}

/// The authoritative credential record for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredential {
    /// OAuth client identifier.
    pub client_id: String,

    /// The client secret.
    pub secret: ClientSecret,

    /// Whether the client can keep a secret. Only confidential clients may
    /// use the client credentials grant.
    pub confidential: bool,
}

impl ClientCredential {
    /// Creates a confidential client credential.
    #[must_use]
    pub fn confidential(client_id: impl Into<String>, secret: ClientSecret) -> Self {
        Self {
            client_id: client_id.into(),
            secret,
            confidential: true,
        }
    }

    /// Creates a public client credential.
    #[must_use]
    pub fn public(client_id: impl Into<String>, secret: ClientSecret) -> Self {
        Self {
            client_id: client_id.into(),
            secret,
            confidential: false,
        }
    }
}

// =============================================================================
// Credential Store Trait
// =============================================================================

/// Lookup of client credentials by identifier.
///
/// # Example
///
/// ```ignore
/// use tollgate_auth::storage::CredentialStore;
///
/// async fn example(store: &impl CredentialStore) -> AuthResult<()> {
///     if let Some(credential) = store.lookup_credential("client123").await? {
///         println!("confidential: {}", credential.confidential);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the credential for `client_id`.
    ///
    /// Returns `None` if the client is not registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn lookup_credential(&self, client_id: &str) -> AuthResult<Option<ClientCredential>>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Credential store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: DashMap<String, ClientCredential>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential, builder style.
    #[must_use]
    pub fn with_credential(self, credential: ClientCredential) -> Self {
        self.insert(credential);
        self
    }

    /// Inserts or replaces a credential, returning the previous one.
    pub fn insert(&self, credential: ClientCredential) -> Option<ClientCredential> {
        self.credentials
            .insert(credential.client_id.clone(), credential)
    }

    /// Removes a credential.
    pub fn remove(&self, client_id: &str) -> Option<ClientCredential> {
        self.credentials.remove(client_id).map(|(_, credential)| credential)
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Returns `true` if no clients are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl FromIterator<ClientCredential> for InMemoryCredentialStore {
    fn from_iter<I: IntoIterator<Item = ClientCredential>>(iter: I) -> Self {
        let store = Self::new();
        for credential in iter {
            store.insert(credential);
        }
        store
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup_credential(&self, client_id: &str) -> AuthResult<Option<ClientCredential>> {
        Ok(self
            .credentials
            .get(client_id)
            .map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_secret_verify() {
        let secret = ClientSecret::plain("secret456");
        assert!(secret.verify("secret456").unwrap());
        assert!(!secret.verify("secret457").unwrap());
        assert!(!secret.verify("").unwrap());
        assert!(!secret.verify("secret4567").unwrap());
    }

    #[test]
    fn test_hashed_secret_verify() {
        let secret = ClientSecret::hash("secret456").unwrap();
        assert!(matches!(secret, ClientSecret::Argon2(_)));
        assert!(secret.verify("secret456").unwrap());
        assert!(!secret.verify("wrong").unwrap());
    }

    #[test]
    fn test_argon2_requires_phc_string() {
        assert!(ClientSecret::argon2("secret456").is_err());

        let hash = password::hash_password("secret456").unwrap();
        let secret = ClientSecret::argon2(hash).unwrap();
        assert!(secret.verify("secret456").unwrap());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let debug = format!("{:?}", ClientSecret::plain("secret456"));
        assert!(!debug.contains("secret456"));
    }

    #[tokio::test]
    async fn test_in_memory_lookup() {
        let store = InMemoryCredentialStore::new().with_credential(ClientCredential::confidential(
            "client123",
            ClientSecret::plain("secret456"),
        ));
        assert_eq!(store.len(), 1);

        let credential = store.lookup_credential("client123").await.unwrap().unwrap();
        assert_eq!(credential.client_id, "client123");
        assert!(credential.confidential);

        assert!(store.lookup_credential("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_replaces_and_remove() {
        let store: InMemoryCredentialStore = [ClientCredential::confidential(
            "client123",
            ClientSecret::plain("old"),
        )]
        .into_iter()
        .collect();

        let previous = store.insert(ClientCredential::confidential(
            "client123",
            ClientSecret::plain("new"),
        ));
        assert_eq!(previous.unwrap().secret, ClientSecret::plain("old"));

        let credential = store.lookup_credential("client123").await.unwrap().unwrap();
        assert!(credential.secret.verify("new").unwrap());

        assert!(store.remove("client123").is_some());
        assert!(store.is_empty());
    }
}
