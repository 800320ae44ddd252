//! Signature computation and verification.
//!
//! ## Supported Algorithms
//!
//! - **HS256**: HMAC-SHA256 over the signing input with a shared secret
//! - **RS256**: RSASSA-PKCS1-v1_5 over the SHA-256 digest of the signing input
//!
//! A signature that does not match is a normal outcome and comes back as
//! `Ok(false)`. Errors are reserved for keys that cannot serve the algorithm.

use hmac::{Hmac, Mac};
use rsa::{Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};

use crate::token::algorithm::SigningAlgorithm;
use crate::token::error::JwtError;
use crate::token::key::Key;

type HmacSha256 = Hmac<Sha256>;

/// Signs `message` with `key` under `alg`.
///
/// # Errors
/// Returns `InvalidKey` if the key does not fit the algorithm or cannot sign.
pub fn sign(message: &[u8], key: &Key, alg: SigningAlgorithm) -> Result<Vec<u8>, JwtError> {
    match (alg, key) {
        (SigningAlgorithm::HS256, Key::Hmac(secret)) => {
            let mut mac = hmac_sha256(secret)?;
            mac.update(message);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        (SigningAlgorithm::RS256, Key::RsaPrivate(private_key)) => {
            let digest = Sha256::digest(message);
            private_key
                .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
                .map_err(|e| JwtError::invalid_key(format!("RS256 signing failed: {e}")))
        }
        (SigningAlgorithm::RS256, Key::RsaPublic(_)) => Err(JwtError::invalid_key(
            "RS256 signing requires an RSA private key",
        )),
        (alg, key) => Err(unusable_key(alg, key)),
    }
}

/// Verifies `signature` over `message` with `key` under `alg`.
///
/// Returns `Ok(false)` when the signature does not match. HMAC tags are
/// compared in constant time.
///
/// # Errors
/// Returns `InvalidKey` if the key does not fit the algorithm.
pub fn verify(
    message: &[u8],
    signature: &[u8],
    key: &Key,
    alg: SigningAlgorithm,
) -> Result<bool, JwtError> {
    match (alg, key) {
        (SigningAlgorithm::HS256, Key::Hmac(secret)) => {
            let mut mac = hmac_sha256(secret)?;
            mac.update(message);
            Ok(mac.verify_slice(signature).is_ok())
        }
        (SigningAlgorithm::RS256, Key::RsaPublic(public_key)) => {
            Ok(verify_rs256(public_key, message, signature))
        }
        (SigningAlgorithm::RS256, Key::RsaPrivate(private_key)) => Ok(verify_rs256(
            &private_key.to_public_key(),
            message,
            signature,
        )),
        (alg, key) => Err(unusable_key(alg, key)),
    }
}

fn hmac_sha256(secret: &[u8]) -> Result<HmacSha256, JwtError> {
    HmacSha256::new_from_slice(secret).map_err(|e| JwtError::invalid_key(e.to_string()))
}

fn verify_rs256(public_key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> bool {
    let digest = Sha256::digest(message);
    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
        .is_ok()
}

fn unusable_key(alg: SigningAlgorithm, key: &Key) -> JwtError {
    JwtError::invalid_key(format!("{} cannot be used with {}", key.kind(), alg))
}
