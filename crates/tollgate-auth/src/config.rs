//! Authentication configuration.
//!
//! Everything needed to stand up a [`TokenIssuer`]: issuer name, token
//! lifetime, clock skew, the signing key and the registered clients.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! issuer = "https://auth.example.com"
//! access_token_lifetime = "1h"
//! clock_skew = "30s"
//!
//! [auth.signing]
//! algorithm = "HS256"
//! secret = "change-me-to-at-least-32-bytes-of-entropy"
//!
//! [[auth.clients]]
//! client_id = "client123"
//! secret_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::{ClientCredentialsAuthenticator, StaticKeyProvider, TokenIssuer};
use crate::storage::{ClientCredential, ClientSecret, InMemoryCredentialStore};
use crate::token::{Key, SigningAlgorithm, TokenCodec};

/// Root authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Issuer written to the `iss` claim.
    pub issuer: String,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Clock skew tolerated when verifying `exp`, `nbf` and `iat`.
    #[serde(with = "humantime_serde")]
    pub clock_skew: Duration,

    /// Token signing configuration.
    pub signing: SigningConfig,

    /// Registered clients.
    pub clients: Vec<ClientConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            access_token_lifetime: Duration::from_secs(3600),
            clock_skew: Duration::ZERO,
            signing: SigningConfig::default(),
            clients: Vec::new(),
        }
    }
}

/// Token signing configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Signing algorithm: `HS256` or `RS256`.
    pub algorithm: SigningAlgorithm,

    /// Shared secret for HS256.
    pub secret: Option<String>,

    /// PEM encoded RSA private key for RS256 (PKCS#8 or PKCS#1).
    pub private_key_pem: Option<String>,

    /// Path to a PEM encoded RSA private key for RS256.
    pub private_key_path: Option<PathBuf>,

    /// Minimum HS256 secret length in bytes.
    pub min_secret_length: usize,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            algorithm: SigningAlgorithm::HS256,
            secret: None,
            private_key_pem: None,
            private_key_path: None,
            min_secret_length: 32,
        }
    }
}

impl std::fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningConfig")
            .field("algorithm", &self.algorithm)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("private_key_pem", &self.private_key_pem.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("min_secret_length", &self.min_secret_length)
            .finish()
    }
}

/// A registered client.
#[derive(Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// OAuth client identifier.
    pub client_id: String,

    /// Plain client secret.
    #[serde(default)]
    pub secret: Option<String>,

    /// Argon2 PHC hash of the client secret. Takes precedence over `secret`.
    #[serde(default)]
    pub secret_hash: Option<String>,

    /// Whether the client is confidential. Public clients cannot use the
    /// client credentials grant.
    #[serde(default = "default_confidential")]
    pub confidential: bool,
}

fn default_confidential() -> bool {
    true
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("secret_hash", &self.secret_hash.as_ref().map(|_| "<redacted>"))
            .field("confidential", &self.confidential)
            .finish()
    }
}

impl ClientConfig {
    fn to_credential(&self) -> AuthResult<ClientCredential> {
        let secret = match (&self.secret_hash, &self.secret) {
            (Some(hash), _) => ClientSecret::argon2(hash.clone())?,
            (None, Some(secret)) => ClientSecret::plain(secret.clone()),
            (None, None) => {
                return Err(AuthError::configuration(format!(
                    "client '{}' has no secret",
                    self.client_id
                )));
            }
        };

        Ok(ClientCredential {
            client_id: self.client_id.clone(),
            secret,
            confidential: self.confidential,
        })
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The issuer is empty
    /// - The access token lifetime is zero
    /// - The HS256 secret is shorter than `min_secret_length`
    /// - A client ID is empty or registered twice
    /// - A `secret_hash` is not an Argon2 PHC string
    ///
    /// Returns `ConfigError::Missing` if:
    /// - HS256 is selected without a secret
    /// - RS256 is selected without a private key
    /// - A client has neither `secret` nor `secret_hash`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::InvalidValue("issuer cannot be empty".to_string()));
        }

        if self.access_token_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "access_token_lifetime must be greater than zero".to_string(),
            ));
        }

        self.signing.validate()?;

        let mut seen = HashSet::new();
        for client in &self.clients {
            if client.client_id.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "client_id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(client.client_id.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "client '{}' is registered more than once",
                    client.client_id
                )));
            }
            match (&client.secret_hash, &client.secret) {
                (Some(hash), _) if !crate::password::is_argon2_hash(hash) => {
                    return Err(ConfigError::InvalidValue(format!(
                        "secret_hash of client '{}' is not an Argon2 PHC string",
                        client.client_id
                    )));
                }
                (None, None) => {
                    return Err(ConfigError::Missing(format!(
                        "secret or secret_hash for client '{}'",
                        client.client_id
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Builds the key provider described by `signing`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the key is missing, unreadable, or does not
    /// match the algorithm.
    pub fn build_key_provider(&self) -> AuthResult<StaticKeyProvider> {
        match self.signing.algorithm {
            SigningAlgorithm::HS256 => {
                let secret = self.signing.secret.as_deref().ok_or_else(|| {
                    AuthError::configuration("HS256 signing requires signing.secret")
                })?;
                Ok(StaticKeyProvider::hmac(secret))
            }
            SigningAlgorithm::RS256 => {
                let pem = match (&self.signing.private_key_pem, &self.signing.private_key_path) {
                    (Some(pem), _) => pem.clone(),
                    (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| {
                        AuthError::configuration(format!(
                            "Failed to read private key {}: {e}",
                            path.display()
                        ))
                    })?,
                    (None, None) => {
                        return Err(AuthError::configuration(
                            "RS256 signing requires signing.private_key_pem or signing.private_key_path",
                        ));
                    }
                };
                let key = Key::rsa_private_from_pem(&pem)
                    .map_err(|e| AuthError::configuration(e.to_string()))?;
                StaticKeyProvider::new(SigningAlgorithm::RS256, key)
            }
        }
    }

    /// Builds an in-memory store holding the configured clients.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if a client has no usable secret.
    pub fn build_credential_store(&self) -> AuthResult<InMemoryCredentialStore> {
        let store = InMemoryCredentialStore::new();
        for client in &self.clients {
            store.insert(client.to_credential()?);
        }
        Ok(store)
    }

    /// Builds a token issuer from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the key provider or the credential store
    /// cannot be built.
    pub fn build_issuer(&self) -> AuthResult<TokenIssuer> {
        let keys = self.build_key_provider()?;
        let store = self.build_credential_store()?;

        info!(
            issuer = %self.issuer,
            alg = %self.signing.algorithm,
            clients = store.len(),
            "Token issuer configured"
        );

        let authenticator = ClientCredentialsAuthenticator::new(Arc::new(store), self.issuer.clone())
            .with_ttl(self.access_token_lifetime);

        Ok(TokenIssuer::new(authenticator, Arc::new(keys))
            .with_codec(TokenCodec::with_skew(self.clock_skew)))
    }
}

impl SigningConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.algorithm {
            SigningAlgorithm::HS256 => {
                let secret = self
                    .secret
                    .as_deref()
                    .ok_or_else(|| ConfigError::Missing("signing.secret for HS256".to_string()))?;
                if secret.len() < self.min_secret_length {
                    return Err(ConfigError::InvalidValue(format!(
                        "signing.secret must be at least {} bytes, got {}",
                        self.min_secret_length,
                        secret.len()
                    )));
                }
            }
            SigningAlgorithm::RS256 => {
                if self.private_key_pem.is_none() && self.private_key_path.is_none() {
                    return Err(ConfigError::Missing(
                        "signing.private_key_pem or signing.private_key_path for RS256".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
