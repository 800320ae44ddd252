//! Token endpoint types.
//!
//! Request, response and error bodies for the client credentials grant, as
//! defined in RFC 6749 sections 4.4 and 5.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// The only grant type this server handles.
pub const CLIENT_CREDENTIALS: &str = "client_credentials";

/// Token request parameters.
///
/// Sent as `application/x-www-form-urlencoded`. The client may authenticate
/// with `client_id` + `client_secret` in the body or with an HTTP Basic
/// `Authorization` header (not part of this struct).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type. Must be `client_credentials`.
    #[serde(default)]
    pub grant_type: String,

    /// Client ID (client_secret_post).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Client secret (client_secret_post).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl TokenRequest {
    /// Creates a client credentials request with the secret in the body.
    #[must_use]
    pub fn client_credentials(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            grant_type: CLIENT_CREDENTIALS.to_string(),
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
        }
    }

    /// Creates a client credentials request carrying no credentials, for
    /// clients that authenticate with a Basic header.
    #[must_use]
    pub fn client_credentials_grant() -> Self {
        Self {
            grant_type: CLIENT_CREDENTIALS.to_string(),
            ..Default::default()
        }
    }
}

/// Successful token response.
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 3600
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token (JWT).
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

impl TokenResponse {
    /// Creates a bearer token response.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// Token error response.
///
/// ```json
/// {
///   "error": "invalid_client",
///   "error_description": "Unknown client: ghost"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }

    /// Creates an invalid_request error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidRequest, description)
    }
}

impl From<&AuthError> for TokenError {
    fn from(error: &AuthError) -> Self {
        let code = TokenErrorCode::from(error);
        let description = match error {
            // Do not reveal which half of the credentials was wrong.
            AuthError::UnknownClient { .. } | AuthError::InvalidSecret { .. } => {
                "Client authentication failed".to_string()
            }
            other if other.is_server_error() => "The server could not issue a token".to_string(),
            other => other.to_string(),
        };
        Self::with_description(code, description)
    }
}

/// OAuth 2.0 token error codes.
///
/// Defined in RFC 6749 Section 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed.
    InvalidClient,

    /// The grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The server failed while handling a valid request.
    ServerError,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::InvalidRequest | Self::UnsupportedGrantType => 400,
            Self::ServerError => 500,
        }
    }
}

impl From<&AuthError> for TokenErrorCode {
    fn from(error: &AuthError) -> Self {
        match error {
            AuthError::UnknownClient { .. } | AuthError::InvalidSecret { .. } => Self::InvalidClient,
            AuthError::UnsupportedGrant { .. } => Self::UnsupportedGrantType,
            AuthError::InvalidRequest { .. } => Self::InvalidRequest,
            other if other.is_server_error() => Self::ServerError,
            _ => Self::InvalidRequest,
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::JwtError;

    #[test]
    fn test_token_request_deserialization() {
        let json = r#"{
            "grant_type": "client_credentials",
            "client_id": "client123",
            "client_secret": "secret456"
        }"#;

        let request: TokenRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request, TokenRequest::client_credentials("client123", "secret456"));
    }

    #[test]
    fn test_token_request_missing_fields_default() {
        let request: TokenRequest = serde_json::from_str("{}").unwrap();
        assert!(request.grant_type.is_empty());
        assert!(request.client_id.is_none());
        assert!(request.client_secret.is_none());
    }

    #[test]
    fn test_token_request_serialization_skips_none() {
        let request = TokenRequest {
            grant_type: CLIENT_CREDENTIALS.to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"grant_type": "client_credentials"}));
    }

    #[test]
    fn test_token_response_serialization() {
        let response = TokenResponse::new("eyJ.abc.def".to_string(), 3600);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "eyJ.abc.def");
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 3600);
    }

    #[test]
    fn test_token_error_serialization() {
        let error = TokenError::invalid_request("Missing grant_type");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["error"], "invalid_request");
        assert_eq!(json["error_description"], "Missing grant_type");

        let json = serde_json::to_value(TokenError::new(TokenErrorCode::ServerError)).unwrap();
        assert!(json.get("error_description").is_none());
    }

    #[test]
    fn test_error_code_from_auth_error() {
        assert_eq!(
            TokenErrorCode::from(&AuthError::unknown_client("ghost")),
            TokenErrorCode::InvalidClient
        );
        assert_eq!(
            TokenErrorCode::from(&AuthError::invalid_secret("client123")),
            TokenErrorCode::InvalidClient
        );
        assert_eq!(
            TokenErrorCode::from(&AuthError::unsupported_grant("password")),
            TokenErrorCode::UnsupportedGrantType
        );
        assert_eq!(
            TokenErrorCode::from(&AuthError::storage("down")),
            TokenErrorCode::ServerError
        );
        assert_eq!(
            TokenErrorCode::from(&AuthError::from(JwtError::invalid_key("k"))),
            TokenErrorCode::ServerError
        );
    }

    #[test]
    fn test_credential_failures_share_description() {
        let unknown = TokenError::from(&AuthError::unknown_client("ghost"));
        let wrong = TokenError::from(&AuthError::invalid_secret("client123"));
        assert_eq!(unknown, wrong);
    }

    #[test]
    fn test_error_code_status() {
        assert_eq!(TokenErrorCode::InvalidClient.http_status(), 401);
        assert_eq!(TokenErrorCode::InvalidRequest.http_status(), 400);
        assert_eq!(TokenErrorCode::UnsupportedGrantType.http_status(), 400);
        assert_eq!(TokenErrorCode::ServerError.http_status(), 500);
        assert_eq!(TokenErrorCode::UnsupportedGrantType.to_string(), "unsupported_grant_type");
    }
}
