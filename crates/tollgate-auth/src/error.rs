//! Authentication error types.
//!
//! This module defines the errors returned by the client credentials flow and
//! wraps token errors so every failure reaches the caller typed.

use std::fmt;

use crate::token::error::{ClaimViolation, JwtError};

/// Errors that can occur while authenticating clients and issuing tokens.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential record exists for the client identifier.
    #[error("Unknown client: {client_id}")]
    UnknownClient {
        /// The client identifier that was looked up.
        client_id: String,
    },

    /// The presented secret does not match the stored credential.
    #[error("Invalid client secret for {client_id}")]
    InvalidSecret {
        /// The client identifier whose secret was rejected.
        client_id: String,
    },

    /// The grant type is not `client_credentials`.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrant {
        /// The rejected grant type.
        grant_type: String,
    },

    /// A token could not be encoded or was rejected when decoded.
    #[error(transparent)]
    Token(#[from] JwtError),

    /// The request is missing a parameter or is otherwise malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// An error occurred while storing or retrieving credentials.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `UnknownClient` error.
    #[must_use]
    pub fn unknown_client(client_id: impl Into<String>) -> Self {
        Self::UnknownClient {
            client_id: client_id.into(),
        }
    }

    /// Creates a new `InvalidSecret` error.
    #[must_use]
    pub fn invalid_secret(client_id: impl Into<String>) -> Self {
        Self::InvalidSecret {
            client_id: client_id.into(),
        }
    }

    /// Creates a new `UnsupportedGrant` error.
    #[must_use]
    pub fn unsupported_grant(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrant {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the client or its credentials were rejected.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(self, Self::UnknownClient { .. } | Self::InvalidSecret { .. })
    }

    /// Returns `true` if this is a token error.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        matches!(self, Self::Token(_))
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::UnknownClient { .. }
            | Self::InvalidSecret { .. }
            | Self::UnsupportedGrant { .. }
            | Self::InvalidRequest { .. } => true,
            Self::Token(err) => !matches!(err, JwtError::InvalidKey { .. } | JwtError::Encoding { .. }),
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => false,
        }
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownClient { .. } => ErrorCategory::Authentication,
            Self::InvalidSecret { .. } => ErrorCategory::Authentication,
            Self::UnsupportedGrant { .. } => ErrorCategory::Validation,
            Self::Token(JwtError::InvalidKey { .. }) => ErrorCategory::Configuration,
            Self::Token(JwtError::Encoding { .. }) => ErrorCategory::Internal,
            Self::Token(_) => ErrorCategory::Token,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::UnknownClient { .. } => "invalid_client",
            Self::InvalidSecret { .. } => "invalid_client",
            Self::UnsupportedGrant { .. } => "unsupported_grant_type",
            Self::Token(JwtError::InvalidKey { .. } | JwtError::Encoding { .. }) => "server_error",
            Self::Token(err) if err.is_malformed() => "invalid_request",
            Self::Token(_) => "invalid_token",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::Storage { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Credential failures and rejected tokens are 401, malformed requests,
    /// malformed tokens and unsupported grants are 400, the rest 500.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::UnknownClient { .. } | Self::InvalidSecret { .. } => 401,
            Self::UnsupportedGrant { .. } | Self::InvalidRequest { .. } => 400,
            Self::Token(err) if err.is_malformed() => 400,
            Self::Token(JwtError::InvalidKey { .. } | JwtError::Encoding { .. }) => 500,
            Self::Token(_) => 401,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => 500,
        }
    }
}

impl From<ClaimViolation> for AuthError {
    fn from(violation: ClaimViolation) -> Self {
        Self::Token(violation.into())
    }
}

/// Categories of authentication errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Client identity verification failed.
    Authentication,
    /// A presented token was rejected.
    Token,
    /// Request validation errors.
    Validation,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Token => write!(f, "token"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SigningAlgorithm;

    #[test]
    fn test_error_display() {
        let err = AuthError::unknown_client("ghost");
        assert_eq!(err.to_string(), "Unknown client: ghost");

        let err = AuthError::invalid_secret("client123");
        assert_eq!(err.to_string(), "Invalid client secret for client123");

        let err = AuthError::unsupported_grant("password");
        assert_eq!(err.to_string(), "Unsupported grant type: password");

        let err = AuthError::from(JwtError::SignatureInvalid);
        assert_eq!(err.to_string(), "Invalid signature");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::unknown_client("ghost");
        assert!(err.is_client_error());
        assert!(err.is_credential_error());
        assert!(!err.is_server_error());

        let err = AuthError::from(JwtError::SignatureInvalid);
        assert!(err.is_client_error());
        assert!(err.is_token_error());
        assert!(!err.is_credential_error());

        let err = AuthError::from(JwtError::invalid_key("wrong shape"));
        assert!(err.is_server_error());

        let err = AuthError::storage("database down");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::invalid_secret("c").category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            AuthError::from(ClaimViolation::Expired { exp: 1, now: 2 }).category(),
            ErrorCategory::Token
        );
        assert_eq!(
            AuthError::storage("test").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            AuthError::from(JwtError::invalid_key("k")).category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::unknown_client("ghost").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            AuthError::invalid_secret("c").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            AuthError::unsupported_grant("password").oauth_error_code(),
            "unsupported_grant_type"
        );
        assert_eq!(
            AuthError::from(JwtError::malformed("x")).oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            AuthError::from(JwtError::SignatureInvalid).oauth_error_code(),
            "invalid_token"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(AuthError::unknown_client("ghost").http_status(), 401);
        assert_eq!(AuthError::invalid_secret("c").http_status(), 401);
        assert_eq!(AuthError::unsupported_grant("password").http_status(), 400);
        assert_eq!(AuthError::from(JwtError::malformed("x")).http_status(), 400);
        assert_eq!(
            AuthError::from(JwtError::unsupported_algorithm("none")).http_status(),
            400
        );
        let mismatch = JwtError::AlgorithmMismatch {
            expected: SigningAlgorithm::RS256,
            found: SigningAlgorithm::HS256,
        };
        assert_eq!(AuthError::from(mismatch).http_status(), 401);
        assert_eq!(
            AuthError::from(ClaimViolation::Expired { exp: 1, now: 2 }).http_status(),
            401
        );
        assert_eq!(AuthError::internal("boom").http_status(), 500);
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Authentication.to_string(), "authentication");
        assert_eq!(ErrorCategory::Token.to_string(), "token");
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
