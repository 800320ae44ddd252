//! OAuth 2.0 client credentials grant.
//!
//! This module provides:
//!
//! - Client authentication and claim construction ([`authenticator`])
//! - Signing key providers ([`keys`])
//! - Token issuance and verification ([`issuer`])
//! - Token endpoint request/response types ([`token`])

pub mod authenticator;
pub mod issuer;
pub mod keys;
pub mod token;

pub use authenticator::{
    AuthenticatedClient, ClientCredentialsAuthenticator, DEFAULT_ACCESS_TOKEN_LIFETIME, GrantState,
};
pub use issuer::TokenIssuer;
pub use keys::{KeyProvider, StaticKeyProvider};
pub use token::{CLIENT_CREDENTIALS, TokenError, TokenErrorCode, TokenRequest, TokenResponse};
