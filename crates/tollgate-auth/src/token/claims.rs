//! Claim sets.
//!
//! A [`ClaimSet`] is an ordered JSON object. The registered time claims
//! (`exp`, `nbf`, `iat`) are integer Unix timestamps; everything else is
//! application data and passes through untouched, nested objects included.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::token::error::JwtError;

/// Issuer claim.
pub const ISS: &str = "iss";
/// Subject claim.
pub const SUB: &str = "sub";
/// Audience claim.
pub const AUD: &str = "aud";
/// Expiration time claim.
pub const EXP: &str = "exp";
/// Not-before claim.
pub const NBF: &str = "nbf";
/// Issued-at claim.
pub const IAT: &str = "iat";

/// Ordered mapping of claim names to JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// Creates an empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a claim, replacing any previous value under the same name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Sets `iss`.
    #[must_use]
    pub fn with_issuer(self, issuer: impl Into<String>) -> Self {
        self.with(ISS, issuer.into())
    }

    /// Sets `sub`.
    #[must_use]
    pub fn with_subject(self, subject: impl Into<String>) -> Self {
        self.with(SUB, subject.into())
    }

    /// Sets `iat` to a Unix timestamp.
    #[must_use]
    pub fn with_issued_at(self, iat: i64) -> Self {
        self.with(IAT, iat)
    }

    /// Sets `exp` to a Unix timestamp.
    #[must_use]
    pub fn with_expiration(self, exp: i64) -> Self {
        self.with(EXP, exp)
    }

    /// Sets `nbf` to a Unix timestamp.
    #[must_use]
    pub fn with_not_before(self, nbf: i64) -> Self {
        self.with(NBF, nbf)
    }

    /// Inserts a claim, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Returns a claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns `true` if the claim is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns a string claim, or `None` if absent or not a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// The `iss` claim.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.get_str(ISS)
    }

    /// The `sub` claim.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.get_str(SUB)
    }

    /// The `exp` claim.
    ///
    /// # Errors
    /// Returns `MalformedToken` if the claim is present but not an integer.
    pub fn expiration(&self) -> Result<Option<i64>, JwtError> {
        self.timestamp(EXP)
    }

    /// The `nbf` claim.
    ///
    /// # Errors
    /// Returns `MalformedToken` if the claim is present but not an integer.
    pub fn not_before(&self) -> Result<Option<i64>, JwtError> {
        self.timestamp(NBF)
    }

    /// The `iat` claim.
    ///
    /// # Errors
    /// Returns `MalformedToken` if the claim is present but not an integer.
    pub fn issued_at(&self) -> Result<Option<i64>, JwtError> {
        self.timestamp(IAT)
    }

    fn timestamp(&self, name: &str) -> Result<Option<i64>, JwtError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(value) => value.as_i64().map(Some).ok_or_else(|| {
                JwtError::malformed(format!("claim '{name}' must be an integer timestamp"))
            }),
        }
    }

    /// Number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates claims in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrows the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the claim set, returning the underlying JSON object.
    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for ClaimSet {
    type Error = JwtError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(JwtError::malformed(format!(
                "claims must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_builder_sets_registered_claims() {
        let claims = ClaimSet::new()
            .with_issuer("https://auth.example.com")
            .with_subject("client123")
            .with_issued_at(1_700_000_000)
            .with_expiration(1_700_003_600)
            .with_not_before(1_700_000_000);

        assert_eq!(claims.issuer(), Some("https://auth.example.com"));
        assert_eq!(claims.subject(), Some("client123"));
        assert_eq!(claims.issued_at().unwrap(), Some(1_700_000_000));
        assert_eq!(claims.expiration().unwrap(), Some(1_700_003_600));
        assert_eq!(claims.not_before().unwrap(), Some(1_700_000_000));
        assert_eq!(claims.len(), 5);
    }

    #[test]
    fn test_absent_timestamps_are_none() {
        let claims = ClaimSet::new().with_subject("client123");
        assert_eq!(claims.expiration().unwrap(), None);
        assert_eq!(claims.not_before().unwrap(), None);
        assert_eq!(claims.issued_at().unwrap(), None);
    }

    #[test]
    fn test_non_integer_timestamp_is_malformed() {
        for value in [json!("1700000000"), json!(1.5), json!(null), json!({"at": 1})] {
            let claims = ClaimSet::new().with(EXP, value);
            let err = claims.expiration().unwrap_err();
            assert!(matches!(err, JwtError::MalformedToken { .. }));
        }
    }

    #[test]
    fn test_insertion_order_preserved() {
        let claims = ClaimSet::new()
            .with("email", "dario@example.com")
            .with("website", "https://example.com")
            .with("data", json!({"product": "apple"}));

        let names: Vec<&str> = claims.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["email", "website", "data"]);

        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(
            json,
            r#"{"email":"dario@example.com","website":"https://example.com","data":{"product":"apple"}}"#
        );
    }

    #[test]
    fn test_nested_claims_survive_serde() {
        let claims = ClaimSet::new()
            .with("data", json!({"product": "apple", "tags": ["a", "b"]}))
            .with("admin", true)
            .with("ratio", 0.25);

        let json = serde_json::to_vec(&claims).unwrap();
        let parsed: ClaimSet = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed, claims);
        assert_eq!(parsed.get("data").unwrap()["product"], "apple");
    }

    #[test]
    fn test_try_from_requires_object() {
        assert!(ClaimSet::try_from(json!({"sub": "x"})).is_ok());

        let err = ClaimSet::try_from(json!(["sub"])).unwrap_err();
        assert_eq!(
            err,
            JwtError::malformed("claims must be a JSON object, found an array")
        );
    }

    #[test]
    fn test_insert_replaces() {
        let mut claims = ClaimSet::new().with_subject("a");
        let previous = claims.insert(SUB, "b");
        assert_eq!(previous, Some(json!("a")));
        assert_eq!(claims.subject(), Some("b"));
        assert!(claims.contains(SUB));
        assert!(!claims.contains(AUD));
    }
}
