//! Access token issuance and verification.
//!
//! Joins the authenticator to the codec: authenticated clients get a signed
//! access token, and presented tokens are verified with the provider's key
//! and algorithm.

use std::sync::Arc;

use tracing::{debug, info};

use crate::AuthResult;
use crate::oauth::authenticator::ClientCredentialsAuthenticator;
use crate::oauth::keys::KeyProvider;
use crate::oauth::token::TokenResponse;
use crate::token::{ClaimSet, Jwks, TokenCodec};

/// Issues and verifies access tokens for the client credentials grant.
#[derive(Clone)]
pub struct TokenIssuer {
    authenticator: ClientCredentialsAuthenticator,
    keys: Arc<dyn KeyProvider>,
    codec: TokenCodec,
}

impl TokenIssuer {
    /// Creates an issuer with a zero-skew codec.
    #[must_use]
    pub fn new(authenticator: ClientCredentialsAuthenticator, keys: Arc<dyn KeyProvider>) -> Self {
        Self {
            authenticator,
            keys,
            codec: TokenCodec::default(),
        }
    }

    /// Replaces the codec, e.g. to tolerate clock skew on verification.
    #[must_use]
    pub fn with_codec(mut self, codec: TokenCodec) -> Self {
        self.codec = codec;
        self
    }

    /// The authenticator used for issuance.
    #[must_use]
    pub fn authenticator(&self) -> &ClientCredentialsAuthenticator {
        &self.authenticator
    }

    /// Authenticates the client and signs an access token for it.
    ///
    /// # Errors
    ///
    /// Returns the authenticator's errors, or `Token` if signing fails.
    pub async fn issue(
        &self,
        client_id: &str,
        client_secret: &str,
        grant_type: &str,
    ) -> AuthResult<TokenResponse> {
        let client = self
            .authenticator
            .authenticate(client_id, client_secret, grant_type)
            .await?;

        let access_token =
            self.codec
                .encode(&client.claims, self.keys.signing_key(), self.keys.algorithm())?;

        info!(
            client_id = %client.client_id,
            alg = %self.keys.algorithm(),
            expires_in = client.expires_in,
            "Access token issued"
        );

        Ok(TokenResponse::new(access_token, client.expires_in))
    }

    /// Verifies an access token against the provider's key.
    ///
    /// # Errors
    ///
    /// Returns `Token` with the codec's error if the token is rejected.
    pub fn verify(&self, token: &str) -> AuthResult<ClaimSet> {
        let claims = self
            .codec
            .decode(
                token,
                self.keys.verification_key(),
                self.keys.algorithm(),
                self.authenticator.clock(),
            )
            .inspect_err(|e| debug!(error = %e, "Access token rejected"))?;
        Ok(claims)
    }

    /// Public keys for the JWKS endpoint.
    #[must_use]
    pub fn jwks(&self) -> Jwks {
        self.keys.jwks()
    }
}
