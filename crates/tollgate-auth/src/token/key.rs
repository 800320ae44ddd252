//! Key material for signing and verification.
//!
//! A [`Key`] is either a shared HMAC secret or one half of an RSA key pair.
//! Keys carry no algorithm of their own; the caller pairs a key with a
//! [`SigningAlgorithm`] on every call and [`Key::supports`] decides whether the
//! pairing is allowed.

use std::fmt;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::token::algorithm::SigningAlgorithm;
use crate::token::error::JwtError;

/// Smallest RSA modulus accepted, in bits.
pub const MIN_RSA_BITS: usize = 2048;

/// Modulus size used by [`Key::generate_rsa`].
const GENERATED_RSA_BITS: usize = 2048;

// ============================================================================
// Key
// ============================================================================

/// Key material passed to the codec.
#[derive(Clone)]
pub enum Key {
    /// Shared secret for HMAC algorithms.
    Hmac(Vec<u8>),
    /// RSA private key. Signs, and can verify through its public half.
    RsaPrivate(Box<RsaPrivateKey>),
    /// RSA public key. Verifies only.
    RsaPublic(Box<RsaPublicKey>),
}

impl Key {
    /// Creates an HMAC key from a shared secret.
    ///
    /// The engine does not enforce a minimum length; configuration does.
    #[must_use]
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        Self::Hmac(secret.as_ref().to_vec())
    }

    /// Loads an RSA private key from PKCS#8 or PKCS#1 PEM.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the PEM cannot be parsed or the modulus is
    /// smaller than [`MIN_RSA_BITS`].
    pub fn rsa_private_from_pem(pem: &str) -> Result<Self, JwtError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| JwtError::invalid_key(format!("unreadable RSA private key: {e}")))?;
        check_modulus(private_key.size())?;
        Ok(Self::RsaPrivate(Box::new(private_key)))
    }

    /// Loads an RSA public key from SPKI or PKCS#1 PEM.
    ///
    /// # Errors
    /// Returns `InvalidKey` if the PEM cannot be parsed or the modulus is
    /// smaller than [`MIN_RSA_BITS`].
    pub fn rsa_public_from_pem(pem: &str) -> Result<Self, JwtError> {
        let public_key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|e| JwtError::invalid_key(format!("unreadable RSA public key: {e}")))?;
        check_modulus(public_key.size())?;
        Ok(Self::RsaPublic(Box::new(public_key)))
    }

    /// Generates a new 2048-bit RSA private key.
    ///
    /// # Errors
    /// Returns `InvalidKey` if key generation fails.
    pub fn generate_rsa() -> Result<Self, JwtError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, GENERATED_RSA_BITS)
            .map_err(|e| JwtError::invalid_key(format!("RSA key generation failed: {e}")))?;
        Ok(Self::RsaPrivate(Box::new(private_key)))
    }

    /// Returns `true` if this key can be used with `alg`.
    ///
    /// HMAC secrets only serve HS256 and RSA keys only serve RS256. An RSA key
    /// is never reinterpreted as HMAC secret bytes.
    #[must_use]
    pub fn supports(&self, alg: SigningAlgorithm) -> bool {
        match self {
            Self::Hmac(_) => alg.is_symmetric(),
            Self::RsaPrivate(_) | Self::RsaPublic(_) => alg.is_rsa(),
        }
    }

    /// Returns `true` if this key can produce signatures.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        !matches!(self, Self::RsaPublic(_))
    }

    /// Human-readable key kind for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hmac(_) => "HMAC secret",
            Self::RsaPrivate(_) => "RSA private key",
            Self::RsaPublic(_) => "RSA public key",
        }
    }

    /// Returns the key a verifier needs: the secret itself for HMAC, the
    /// public half for RSA.
    #[must_use]
    pub fn verifying_key(&self) -> Key {
        match self {
            Self::Hmac(secret) => Self::Hmac(secret.clone()),
            Self::RsaPrivate(private_key) => Self::RsaPublic(Box::new(private_key.to_public_key())),
            Self::RsaPublic(public_key) => Self::RsaPublic(public_key.clone()),
        }
    }

    /// Exports the public half as a JWK. HMAC secrets are never exported.
    #[must_use]
    pub fn to_jwk(&self) -> Option<Jwk> {
        let public_key = match self {
            Self::Hmac(_) => return None,
            Self::RsaPrivate(private_key) => private_key.to_public_key(),
            Self::RsaPublic(public_key) => (**public_key).clone(),
        };

        let n = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

        Some(Jwk {
            kty: "RSA".to_string(),
            kid: rsa_thumbprint(&n, &e),
            use_: "sig".to_string(),
            alg: SigningAlgorithm::RS256.as_str().to_string(),
            n,
            e,
        })
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hmac(secret) => write!(f, "Key::Hmac(<{} bytes>)", secret.len()),
            Self::RsaPrivate(private_key) => {
                write!(f, "Key::RsaPrivate(<{} bits>)", private_key.size() * 8)
            }
            Self::RsaPublic(public_key) => {
                write!(f, "Key::RsaPublic(<{} bits>)", public_key.size() * 8)
            }
        }
    }
}

fn check_modulus(size_bytes: usize) -> Result<(), JwtError> {
    let bits = size_bytes * 8;
    if bits < MIN_RSA_BITS {
        return Err(JwtError::invalid_key(format!(
            "RSA modulus of {bits} bits is below the {MIN_RSA_BITS}-bit minimum"
        )));
    }
    Ok(())
}

/// RFC 7638 thumbprint of an RSA public key, used as the `kid`.
fn rsa_thumbprint(n: &str, e: &str) -> String {
    // Members in lexicographic order, no whitespace.
    let canonical = format!(r#"{{"e":"{e}","kty":"RSA","n":"{n}"}}"#);
    URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()))
}

// ============================================================================
// JWKS Types
// ============================================================================

/// JSON Web Key Set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jwks {
    /// The keys in this set.
    pub keys: Vec<Jwk>,
}

impl Jwks {
    /// Creates a new empty JWKS.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key to the set.
    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }
}

/// RSA JSON Web Key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type, always "RSA".
    pub kty: String,

    /// Key ID (RFC 7638 thumbprint).
    pub kid: String,

    /// Key use ("sig" for signing).
    #[serde(rename = "use")]
    pub use_: String,

    /// Algorithm.
    pub alg: String,

    /// RSA modulus (base64url encoded).
    pub n: String,

    /// RSA exponent (base64url encoded).
    pub e: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::OnceLock;

    use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};

    use super::*;

    /// One RSA key shared by every test in the crate; generation is slow.
    pub(crate) fn test_rsa_key() -> &'static Key {
        static KEY: OnceLock<Key> = OnceLock::new();
        KEY.get_or_init(|| Key::generate_rsa().unwrap())
    }

    pub(crate) fn test_rsa_pems() -> (String, String) {
        let Key::RsaPrivate(private_key) = test_rsa_key() else {
            unreachable!("test key is an RSA private key");
        };
        let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string();
        let public_pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        (private_pem, public_pem)
    }

    #[test]
    fn test_supports() {
        let hmac = Key::hmac("shared-secret");
        assert!(hmac.supports(SigningAlgorithm::HS256));
        assert!(!hmac.supports(SigningAlgorithm::RS256));

        let rsa = test_rsa_key();
        assert!(rsa.supports(SigningAlgorithm::RS256));
        assert!(!rsa.supports(SigningAlgorithm::HS256));
        assert!(!rsa.verifying_key().supports(SigningAlgorithm::HS256));
    }

    #[test]
    fn test_can_sign() {
        assert!(Key::hmac("s").can_sign());
        assert!(test_rsa_key().can_sign());
        assert!(!test_rsa_key().verifying_key().can_sign());
    }

    #[test]
    fn test_pem_round_trip() {
        let (private_pem, public_pem) = test_rsa_pems();

        let private_key = Key::rsa_private_from_pem(&private_pem).unwrap();
        assert!(matches!(private_key, Key::RsaPrivate(_)));

        let public_key = Key::rsa_public_from_pem(&public_pem).unwrap();
        assert!(matches!(public_key, Key::RsaPublic(_)));

        assert_eq!(private_key.to_jwk(), public_key.to_jwk());
    }

    #[test]
    fn test_invalid_pem_rejected() {
        let err = Key::rsa_private_from_pem("not a pem").unwrap_err();
        assert!(err.is_key_error());

        let err = Key::rsa_public_from_pem("-----BEGIN PUBLIC KEY-----\nAAAA\n-----END PUBLIC KEY-----")
            .unwrap_err();
        assert!(err.is_key_error());
    }

    #[test]
    fn test_public_pem_is_not_a_private_key() {
        let (_, public_pem) = test_rsa_pems();
        assert!(Key::rsa_private_from_pem(&public_pem).is_err());
    }

    #[test]
    fn test_jwk_export() {
        let jwk = test_rsa_key().to_jwk().unwrap();
        assert_eq!(jwk.kty, "RSA");
        assert_eq!(jwk.alg, "RS256");
        assert_eq!(jwk.use_, "sig");
        assert_eq!(jwk.e, "AQAB");
        assert!(!jwk.n.is_empty());
        assert_eq!(jwk.kid.len(), 43);

        let json = serde_json::to_value(&jwk).unwrap();
        assert_eq!(json["use"], "sig");
    }

    #[test]
    fn test_hmac_has_no_jwk() {
        assert!(Key::hmac("shared-secret").to_jwk().is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", Key::hmac("shared-secret"));
        assert_eq!(debug, "Key::Hmac(<13 bytes>)");
        assert!(!debug.contains("shared"));

        let debug = format!("{:?}", test_rsa_key());
        assert_eq!(debug, "Key::RsaPrivate(<2048 bits>)");
    }

    #[test]
    fn test_jwks_collects_keys() {
        let mut jwks = Jwks::new();
        assert!(jwks.keys.is_empty());
        jwks.add_key(test_rsa_key().to_jwk().unwrap());
        assert_eq!(jwks.keys.len(), 1);
    }
}
