//! Token error types.

use crate::token::algorithm::SigningAlgorithm;

/// Errors that can occur while encoding or decoding a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JwtError {
    /// The token is not three base64url segments of JSON.
    #[error("Malformed token: {message}")]
    MalformedToken {
        /// Description of what is malformed.
        message: String,
    },

    /// The algorithm identifier is not one of the supported algorithms.
    #[error("Unsupported algorithm: {alg}")]
    UnsupportedAlgorithm {
        /// The identifier that was rejected.
        alg: String,
    },

    /// The token header declares a different algorithm than the caller expects.
    #[error("Algorithm mismatch: expected {expected}, token declares {found}")]
    AlgorithmMismatch {
        /// Algorithm the caller asked for.
        expected: SigningAlgorithm,
        /// Algorithm declared by the token header.
        found: SigningAlgorithm,
    },

    /// The key cannot be used with the requested algorithm, or could not be parsed.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// The signature does not match the signed content.
    #[error("Invalid signature")]
    SignatureInvalid,

    /// A time-based claim rejected the token.
    #[error(transparent)]
    ClaimViolation(#[from] ClaimViolation),

    /// Claims or header could not be serialized.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `MalformedToken` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedToken {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedAlgorithm` error.
    #[must_use]
    pub fn unsupported_algorithm(alg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm { alg: alg.into() }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Returns `true` if the token was rejected by `exp`, `nbf` or `iat`.
    #[must_use]
    pub fn is_claim_violation(&self) -> bool {
        matches!(self, Self::ClaimViolation(_))
    }

    /// Returns `true` if this is a key-related error.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::InvalidKey { .. })
    }

    /// Returns `true` if the token itself could not be parsed.
    ///
    /// These are the failures a client can fix by sending a well-formed token;
    /// everything else means the token was understood and refused.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken { .. } | Self::UnsupportedAlgorithm { .. }
        )
    }
}

/// A time-based claim that rejected the token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimViolation {
    /// `exp` is at or before the current time.
    #[error("Token expired at {exp} (now {now})")]
    Expired {
        /// The `exp` claim.
        exp: i64,
        /// Current time used for the check.
        now: i64,
    },

    /// `nbf` or `iat` is after the current time.
    #[error("Token not valid before {not_before} ({claim}, now {now})")]
    NotYetValid {
        /// The claim that failed, `nbf` or `iat`.
        claim: &'static str,
        /// The claim value.
        not_before: i64,
        /// Current time used for the check.
        now: i64,
    },
}

impl ClaimViolation {
    /// Returns `true` for `Expired`.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}
