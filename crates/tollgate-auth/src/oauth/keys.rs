//! Signing key providers.

use crate::AuthResult;
use crate::error::AuthError;
use crate::token::{Jwks, Key, SigningAlgorithm};

/// Source of the keys used to sign and verify access tokens.
///
/// The algorithm is fixed by the provider, never by the token being checked.
pub trait KeyProvider: Send + Sync {
    /// The algorithm every issued token is signed with.
    fn algorithm(&self) -> SigningAlgorithm;

    /// Key used to sign new tokens.
    fn signing_key(&self) -> &Key;

    /// Key used to verify tokens.
    fn verification_key(&self) -> &Key;

    /// Public keys to publish. Empty for symmetric algorithms.
    fn jwks(&self) -> Jwks {
        let mut jwks = Jwks::new();
        if let Some(jwk) = self.verification_key().to_jwk() {
            jwks.add_key(jwk);
        }
        jwks
    }
}

/// A provider holding a single key for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    algorithm: SigningAlgorithm,
    signing: Key,
    verification: Key,
}

impl StaticKeyProvider {
    /// Creates a provider signing with `key` under `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if `key` cannot sign with `algorithm`.
    pub fn new(algorithm: SigningAlgorithm, key: Key) -> AuthResult<Self> {
        if !key.supports(algorithm) || !key.can_sign() {
            return Err(AuthError::configuration(format!(
                "{} cannot sign {} tokens",
                key.kind(),
                algorithm
            )));
        }

        let verification = key.verifying_key();
        Ok(Self {
            algorithm,
            signing: key,
            verification,
        })
    }

    /// HS256 provider over a shared secret.
    #[must_use]
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        let key = Key::hmac(secret);
        Self {
            algorithm: SigningAlgorithm::HS256,
            verification: key.clone(),
            signing: key,
        }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    fn signing_key(&self) -> &Key {
        &self.signing
    }

    fn verification_key(&self) -> &Key {
        &self.verification
    }
}
