//! Token encoding, signing and validation.
//!
//! This module provides:
//!
//! - The compact JWT codec ([`codec`])
//! - HS256 and RS256 signing and verification ([`signature`])
//! - Key material and JWK export ([`key`])
//! - Claim sets and time-based claim validation ([`claims`], [`validation`])

pub mod algorithm;
pub mod claims;
pub mod codec;
pub mod error;
pub mod key;
pub mod signature;
pub mod validation;

pub use algorithm::SigningAlgorithm;
pub use claims::ClaimSet;
pub use codec::{TokenCodec, TokenHeader, decode, decode_unverified_header, encode};
pub use error::{ClaimViolation, JwtError};
pub use key::{Jwk, Jwks, Key};
pub use signature::{sign, verify};
pub use validation::{ClaimValidator, Clock, FixedClock, SystemClock};
