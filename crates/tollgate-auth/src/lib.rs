//! # tollgate-auth
//!
//! Signed token issuance and verification for machine clients.
//!
//! This crate provides:
//! - A compact JWT codec (`header.payload.signature`) with HS256 and RS256
//! - Time-based claim validation with configurable clock skew
//! - The OAuth 2.0 client credentials grant
//! - Credential and account storage traits with in-memory implementations
//! - Axum handlers for the token, JWKS and introspection endpoints
//! - A reqwest client for requesting tokens from a remote endpoint
//!
//! ## Overview
//!
//! Keys are never held by the codec. Callers pass the key and the expected
//! algorithm on every call, and the token header is only checked against
//! them, so a token cannot choose how it is verified.
//!
//! ```ignore
//! use tollgate_auth::token::{ClaimSet, Key, SigningAlgorithm, SystemClock, decode, encode};
//!
//! let key = Key::hmac(secret_from_config);
//! let claims = ClaimSet::new().with_subject("client123").with_expiration(exp);
//! let token = encode(&claims, &key, SigningAlgorithm::HS256)?;
//! let decoded = decode(&token, &key, SigningAlgorithm::HS256, &SystemClock)?;
//! ```
//!
//! ## Modules
//!
//! - [`token`] - Codec, signature engine, keys and claim validation
//! - [`oauth`] - Client credentials authenticator and token issuer
//! - [`storage`] - Credential and account storage traits
//! - [`http`] - Axum HTTP handlers
//! - [`client`] - HTTP client for the client credentials grant
//! - [`config`] - Authentication configuration
//! - [`password`] - Argon2 hashing for secrets and passwords

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod password;
pub mod storage;
pub mod token;

pub use client::{ClientCredentialsClient, ClientError};
pub use config::{AuthConfig, ClientConfig, ConfigError, SigningConfig};
pub use error::{AuthError, ErrorCategory};
pub use http::{AuthRouterState, introspect_handler, jwks_handler, token_handler};
pub use oauth::{
    AuthenticatedClient, ClientCredentialsAuthenticator, GrantState, KeyProvider,
    StaticKeyProvider, TokenIssuer,
};
pub use storage::{
    Account, AccountStore, ClientCredential, ClientSecret, CredentialStore, InMemoryAccountStore,
    InMemoryCredentialStore,
};
pub use token::{
    ClaimSet, ClaimValidator, ClaimViolation, Clock, FixedClock, JwtError, Key, SigningAlgorithm,
    SystemClock, TokenCodec,
};

/// Type alias for authentication results.
pub type AuthResult<T> = Result<T, AuthError>;
