//! Client credentials authentication.
//!
//! Checks a `(client_id, client_secret, grant_type)` triple against a
//! [`CredentialStore`] and, on success, builds the claims of the access
//! token to issue.
//!
//! # Flow
//!
//! ```text
//! Received -> Validating -> Issuing
//!                       \-> Rejected
//! ```
//!
//! The grant type is checked before the store is consulted. A rejected grant
//! never reaches the store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::token::CLIENT_CREDENTIALS;
use crate::storage::CredentialStore;
use crate::token::{ClaimSet, Clock, SystemClock};

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// States a client credentials request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantState {
    /// Request accepted for processing.
    Received,
    /// Grant type and credentials are being checked.
    Validating,
    /// Credentials were accepted and claims are being built.
    Issuing,
    /// The request was refused. Terminal.
    Rejected,
}

impl GrantState {
    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Issuing => "issuing",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` for states with no outgoing transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Issuing | Self::Rejected)
    }
}

impl fmt::Display for GrantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A client whose credentials were accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedClient {
    /// The authenticated client ID.
    pub client_id: String,

    /// Claims of the access token to issue: `iss`, `sub`, `iat`, `exp`.
    pub claims: ClaimSet,

    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Authenticates machine clients with the client credentials grant.
///
/// # Example
///
/// ```ignore
/// let authenticator = ClientCredentialsAuthenticator::new(store, "https://auth.example.com")
///     .with_ttl(Duration::from_secs(900));
///
/// let client = authenticator
///     .authenticate("client123", "secret456", "client_credentials")
///     .await?;
/// assert_eq!(client.claims.subject(), Some("client123"));
/// ```
#[derive(Clone)]
pub struct ClientCredentialsAuthenticator {
    store: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
    issuer: String,
    ttl: Duration,
}

impl ClientCredentialsAuthenticator {
    /// Creates an authenticator with the system clock and a one hour TTL.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, issuer: impl Into<String>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            issuer: issuer.into(),
            ttl: DEFAULT_ACCESS_TOKEN_LIFETIME,
        }
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the clock used for `iat` and `exp`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The clock used for issuance.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// The configured issuer.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The configured access token lifetime.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Authenticates a client and builds its token claims.
    ///
    /// # Errors
    ///
    /// - `UnsupportedGrant` if `grant_type` is not `client_credentials`
    /// - `UnknownClient` if no credential is stored for `client_id`
    /// - `InvalidSecret` if the secret does not match, or the client is not
    ///   confidential
    /// - `Storage` if the store fails
    pub async fn authenticate(
        &self,
        client_id: &str,
        client_secret: &str,
        grant_type: &str,
    ) -> AuthResult<AuthenticatedClient> {
        let mut state = GrantState::Received;
        debug!(client_id = %client_id, state = %state, "Client credentials request");

        state = self.transition(client_id, state, GrantState::Validating);

        let result = self
            .validate(client_id, client_secret, grant_type)
            .await;

        match result {
            Ok(()) => {
                self.transition(client_id, state, GrantState::Issuing);
                Ok(self.build(client_id))
            }
            Err(e) => {
                self.transition(client_id, state, GrantState::Rejected);
                warn!(client_id = %client_id, error = %e, "Client credentials rejected");
                Err(e)
            }
        }
    }

    async fn validate(
        &self,
        client_id: &str,
        client_secret: &str,
        grant_type: &str,
    ) -> AuthResult<()> {
        if grant_type != CLIENT_CREDENTIALS {
            return Err(AuthError::unsupported_grant(grant_type));
        }

        self.verify_client(client_id, client_secret).await
    }

    /// Checks a client's credentials without issuing anything.
    ///
    /// Used by endpoints that require an authenticated caller, such as
    /// introspection.
    ///
    /// # Errors
    ///
    /// - `UnknownClient` if no credential is stored for `client_id`
    /// - `InvalidSecret` if the secret does not match, or the client is not
    ///   confidential
    /// - `Storage` if the store fails
    pub async fn verify_client(&self, client_id: &str, client_secret: &str) -> AuthResult<()> {
        let credential = self
            .store
            .lookup_credential(client_id)
            .await?
            .ok_or_else(|| AuthError::unknown_client(client_id))?;

        if !credential.confidential {
            debug!(client_id = %client_id, "Public clients cannot authenticate with a secret");
            return Err(AuthError::invalid_secret(client_id));
        }

        if !credential.secret.verify(client_secret)? {
            return Err(AuthError::invalid_secret(client_id));
        }

        Ok(())
    }

    fn build(&self, client_id: &str) -> AuthenticatedClient {
        let now = self.clock.now();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = ClaimSet::new()
            .with_issuer(self.issuer.clone())
            .with_subject(client_id)
            .with_issued_at(now)
            .with_expiration(now.saturating_add(ttl));

        AuthenticatedClient {
            client_id: client_id.to_string(),
            claims,
            expires_in: self.ttl.as_secs(),
        }
    }

    fn transition(&self, client_id: &str, from: GrantState, to: GrantState) -> GrantState {
        debug!(client_id = %client_id, from = %from, to = %to, "Grant state transition");
        to
    }
}

impl fmt::Debug for ClientCredentialsAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsAuthenticator")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
