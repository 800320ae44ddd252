//! Secret generation and Argon2 hashing.
//!
//! Client secrets and account passwords are stored as Argon2id hashes in PHC
//! string format, salted with `OsRng`.
//!
//! # Example
//!
//! ```
//! use tollgate_auth::password::{generate_client_secret, hash_password, verify_password};
//!
//! let secret = generate_client_secret();
//! let hash = hash_password(&secret).unwrap();
//! assert!(verify_password(&secret, &hash).unwrap());
//! ```

use argon2::{
    Algorithm, Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::Rng;

/// Prefix of generated client secrets.
pub const CLIENT_SECRET_PREFIX: &str = "tgs_";

/// Generate a new client secret.
///
/// 32 random bytes, hex encoded, with a `tgs_` prefix (68 characters).
#[must_use]
pub fn generate_client_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    format!("{CLIENT_SECRET_PREFIX}{}", hex::encode(bytes))
}

/// Hash a password or client secret with Argon2id.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash.
///
/// `Ok(false)` on mismatch; `Err` only if the stored hash is not a valid PHC
/// string.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if the hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    let result = Argon2::default().verify_password(password.as_bytes(), &parsed_hash);
    Ok(result.is_ok())
}

/// Returns `true` if `value` is a complete Argon2 PHC string: an Argon2
/// algorithm identifier, a salt and a hash output.
#[must_use]
pub fn is_argon2_hash(value: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(value) else {
        return false;
    };
    Algorithm::try_from(parsed.algorithm).is_ok() && parsed.salt.is_some() && parsed.hash.is_some()
}
