//! HTTP handlers for the token endpoints.
//!
//! # Available Handlers
//!
//! - [`token`] - Client credentials token endpoint (RFC 6749 Section 4.4)
//! - [`jwks`] - Public signing keys (RFC 7517)
//! - [`introspect`] - Token introspection (RFC 7662)

pub mod introspect;
pub mod jwks;
pub mod token;

use std::sync::Arc;

use crate::oauth::TokenIssuer;

pub use introspect::introspect_handler;
pub use jwks::jwks_handler;
pub use token::token_handler;

/// Shared state for the auth handlers.
#[derive(Clone)]
pub struct AuthRouterState {
    /// Issues and verifies access tokens.
    pub issuer: Arc<TokenIssuer>,
}

impl AuthRouterState {
    /// Creates a new router state.
    #[must_use]
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }
}
