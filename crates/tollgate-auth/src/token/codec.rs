//! Compact JWT encoding and decoding.
//!
//! A token is `b64url(header) "." b64url(payload) "." b64url(signature)`,
//! base64url without padding. The signature covers the exact ASCII bytes of
//! the first two segments, so a token that is re-encoded in any way no longer
//! verifies.
//!
//! Decoding never lets the header pick the verification path. The caller
//! passes the expected algorithm and key; the header algorithm must equal the
//! expected one or the token is refused before any signature check.
//!
//! ## Example
//!
//! ```ignore
//! use tollgate_auth::token::{ClaimSet, Key, SigningAlgorithm, SystemClock, TokenCodec};
//!
//! let codec = TokenCodec::with_skew(Duration::from_secs(30));
//! let key = Key::hmac(secret);
//!
//! let token = codec.encode(&claims, &key, SigningAlgorithm::HS256)?;
//! let claims = codec.decode(&token, &key, SigningAlgorithm::HS256, &SystemClock)?;
//! ```

use std::str::FromStr;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::token::algorithm::SigningAlgorithm;
use crate::token::claims::ClaimSet;
use crate::token::error::JwtError;
use crate::token::key::Key;
use crate::token::signature;
use crate::token::validation::{ClaimValidator, Clock};

/// The only `typ` value written and accepted.
pub const TOKEN_TYPE: &str = "JWT";

// ============================================================================
// Header
// ============================================================================

/// JOSE header of a compact token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenHeader {
    /// Signing algorithm.
    pub alg: SigningAlgorithm,

    /// Token type. Written as `JWT`; optional when reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl TokenHeader {
    /// Header written by [`TokenCodec::encode`].
    #[must_use]
    pub fn new(alg: SigningAlgorithm) -> Self {
        Self {
            alg,
            typ: Some(TOKEN_TYPE.to_string()),
        }
    }
}

/// Header as read off the wire, before the algorithm is checked.
#[derive(Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

// ============================================================================
// Codec
// ============================================================================

/// Encodes and decodes compact tokens.
///
/// The codec holds validation settings only. Keys are passed on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec {
    validator: ClaimValidator,
}

impl TokenCodec {
    /// Creates a codec with the given claim validator.
    #[must_use]
    pub fn new(validator: ClaimValidator) -> Self {
        Self { validator }
    }

    /// Creates a codec tolerating `skew` of clock drift.
    #[must_use]
    pub fn with_skew(skew: Duration) -> Self {
        Self::new(ClaimValidator::new(skew))
    }

    /// Returns the claim validator.
    #[must_use]
    pub fn validator(&self) -> &ClaimValidator {
        &self.validator
    }

    /// Signs `claims` into a compact token.
    ///
    /// # Errors
    /// - `InvalidKey` if `key` cannot sign with `alg`
    /// - `Encoding` if the claims cannot be serialized
    pub fn encode(
        &self,
        claims: &ClaimSet,
        key: &Key,
        alg: SigningAlgorithm,
    ) -> Result<String, JwtError> {
        if !key.supports(alg) {
            return Err(JwtError::invalid_key(format!(
                "{} cannot be used with {}",
                key.kind(),
                alg
            )));
        }

        let header = serde_json::to_vec(&TokenHeader::new(alg))
            .map_err(|e| JwtError::encoding(e.to_string()))?;
        let payload =
            serde_json::to_vec(claims).map_err(|e| JwtError::encoding(e.to_string()))?;

        let mut token = URL_SAFE_NO_PAD.encode(header);
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(payload));

        let signature = signature::sign(token.as_bytes(), key, alg)?;
        token.push('.');
        token.push_str(&URL_SAFE_NO_PAD.encode(signature));

        Ok(token)
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Checks run in this order: structure, header, algorithm, key,
    /// signature, claims.
    ///
    /// # Errors
    /// - `MalformedToken` if the token is not three base64url JSON segments,
    ///   the payload is not an object, or `typ` is not `JWT`
    /// - `UnsupportedAlgorithm` if the header names an unknown algorithm
    /// - `AlgorithmMismatch` if the header algorithm is not `alg`
    /// - `InvalidKey` if `key` cannot verify `alg`
    /// - `SignatureInvalid` if the signature does not verify
    /// - `ClaimViolation` if `exp`, `nbf` or `iat` rejects the token
    pub fn decode(
        &self,
        token: &str,
        key: &Key,
        alg: SigningAlgorithm,
        clock: &dyn Clock,
    ) -> Result<ClaimSet, JwtError> {
        let segments = split(token)?;
        let header = parse_header(segments.header)?;

        if header.alg != alg {
            return Err(JwtError::AlgorithmMismatch {
                expected: alg,
                found: header.alg,
            });
        }
        if !key.supports(alg) {
            return Err(JwtError::invalid_key(format!(
                "{} cannot be used with {}",
                key.kind(),
                alg
            )));
        }

        let payload = decode_segment(segments.payload, "payload")?;

        // Any change to the signature segment is a signature failure, even
        // one that breaks its base64.
        let signature = URL_SAFE_NO_PAD
            .decode(segments.signature)
            .map_err(|_| JwtError::SignatureInvalid)?;

        if !signature::verify(segments.signing_input.as_bytes(), &signature, key, alg)? {
            return Err(JwtError::SignatureInvalid);
        }

        let value: Value = serde_json::from_slice(&payload)
            .map_err(|e| JwtError::malformed(format!("payload is not valid JSON: {e}")))?;
        let claims = ClaimSet::try_from(value)?;

        self.validator.validate(&claims, clock.now())?;

        Ok(claims)
    }
}

/// Encodes with a zero-skew codec.
///
/// # Errors
/// See [`TokenCodec::encode`].
pub fn encode(claims: &ClaimSet, key: &Key, alg: SigningAlgorithm) -> Result<String, JwtError> {
    TokenCodec::default().encode(claims, key, alg)
}

/// Decodes with a zero-skew codec.
///
/// # Errors
/// See [`TokenCodec::decode`].
pub fn decode(
    token: &str,
    key: &Key,
    alg: SigningAlgorithm,
    clock: &dyn Clock,
) -> Result<ClaimSet, JwtError> {
    TokenCodec::default().decode(token, key, alg, clock)
}

/// Parses the header without verifying anything.
///
/// For logging and diagnostics only. Nothing in the header may be used to
/// choose a key or algorithm.
///
/// # Errors
/// Same structural errors as [`TokenCodec::decode`].
pub fn decode_unverified_header(token: &str) -> Result<TokenHeader, JwtError> {
    let segments = split(token)?;
    parse_header(segments.header)
}

struct Segments<'a> {
    header: &'a str,
    payload: &'a str,
    signature: &'a str,
    signing_input: &'a str,
}

/// Splits off header and payload. Everything after the second `.` is the
/// signature, so a stray `.` there fails as a bad signature.
fn split(token: &str) -> Result<Segments<'_>, JwtError> {
    let parts: Vec<&str> = token.splitn(3, '.').collect();
    let &[header, payload, signature] = parts.as_slice() else {
        return Err(JwtError::malformed(format!(
            "expected 3 segments, found {}",
            parts.len()
        )));
    };

    Ok(Segments {
        header,
        payload,
        signature,
        signing_input: &token[..header.len() + 1 + payload.len()],
    })
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, JwtError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| JwtError::malformed(format!("{name} is not valid base64url: {e}")))
}

fn parse_header(segment: &str) -> Result<TokenHeader, JwtError> {
    let bytes = decode_segment(segment, "header")?;
    let raw: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| JwtError::malformed(format!("header is not valid JSON: {e}")))?;

    if let Some(typ) = raw.typ.as_deref() {
        if typ != TOKEN_TYPE {
            return Err(JwtError::malformed(format!("unexpected token type '{typ}'")));
        }
    }

    Ok(TokenHeader {
        alg: SigningAlgorithm::from_str(&raw.alg)?,
        typ: raw.typ,
    })
}

// ============================================================================
// Tests
// ============================================================================
