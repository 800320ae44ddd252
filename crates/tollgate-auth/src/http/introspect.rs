//! Token introspection handler (RFC 7662).
//!
//! `POST /auth/introspect` with `token=<jwt>`. The caller authenticates as a
//! confidential client, the same way as at the token endpoint. Active tokens
//! are answered with their claims and `"active": true`; anything the issuer
//! rejects is answered with `{"active": false}` and nothing else.

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::http::AuthRouterState;
use crate::http::token::{auth_error_response, extract_client_auth, token_error_response};
use crate::oauth::token::{TokenError, TokenErrorCode};

/// Form parameters for the introspection endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct IntrospectionForm {
    /// The token to introspect.
    #[serde(default)]
    pub token: String,

    /// Optional hint about the token type. Only access tokens exist here.
    #[serde(default)]
    pub token_type_hint: Option<String>,

    /// Client ID of the caller (client_secret_post).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret of the caller (client_secret_post).
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Token introspection endpoint handler.
///
/// The caller authenticates with an HTTP Basic `Authorization` header or
/// with `client_id` and `client_secret` in the body.
///
/// # Responses
///
/// - 200 `{"active": true, ...claims}` for a valid token
/// - 200 `{"active": false}` for invalid, expired or foreign tokens
/// - 400 `invalid_request` if `token` is missing
/// - 401 `invalid_client` if the caller is not an authenticated client
pub async fn introspect_handler(
    State(state): State<AuthRouterState>,
    headers: HeaderMap,
    Form(form): Form<IntrospectionForm>,
) -> Response {
    let Some((client_id, client_secret)) = extract_client_auth(
        &headers,
        form.client_id.as_deref(),
        form.client_secret.as_deref(),
    ) else {
        return token_error_response(&TokenError::with_description(
            TokenErrorCode::InvalidClient,
            "Client authentication required",
        ));
    };

    if let Err(e) = state
        .issuer
        .authenticator()
        .verify_client(&client_id, &client_secret)
        .await
    {
        warn!(client_id = %client_id, error = %e, "Introspection caller rejected");
        return auth_error_response(&e);
    }

    if form.token.is_empty() {
        return token_error_response(&TokenError::invalid_request(
            "Missing required 'token' parameter",
        ));
    }

    let active = match state.issuer.verify(&form.token) {
        Ok(claims) => Some(claims.into_map()),
        Err(e) => {
            debug!(error = %e, "Introspected token is inactive");
            None
        }
    };

    let is_active = active.is_some();
    debug!(
        client_id = %client_id,
        active = is_active,
        "Token introspection completed"
    );

    let mut body = active.unwrap_or_else(Map::new);
    // Set last so a signed `active` claim cannot override it.
    body.insert("active".to_string(), Value::Bool(is_active));
    (StatusCode::OK, Json(Value::Object(body))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::test_state;
    use crate::token::{ClaimSet, Key, SigningAlgorithm, encode};
    use axum::http::{HeaderValue, header};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn form(token: &str) -> IntrospectionForm {
        IntrospectionForm {
            token: token.to_string(),
            client_id: Some("client123".to_string()),
            client_secret: Some("secret456".to_string()),
            ..Default::default()
        }
    }

    async fn call(headers: HeaderMap, form: IntrospectionForm) -> (StatusCode, HeaderMap, Value) {
        let response = introspect_handler(State(test_state()), headers, Form(form)).await;
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, serde_json::from_slice(&body).unwrap())
    }

    async fn introspect(token: &str) -> (StatusCode, Value) {
        let (status, _, body) = call(HeaderMap::new(), form(token)).await;
        (status, body)
    }

    async fn issued_token() -> String {
        test_state()
            .issuer
            .issue("client123", "secret456", "client_credentials")
            .await
            .unwrap()
            .access_token
    }

    #[tokio::test]
    async fn test_active_token_returns_claims() {
        let token = issued_token().await;

        let (status, body) = introspect(&token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], true);
        assert_eq!(body["sub"], "client123");
        assert!(body["exp"].is_i64());
    }

    #[tokio::test]
    async fn test_basic_auth_caller() {
        let token = issued_token().await;
        let mut headers = HeaderMap::new();
        let encoded = STANDARD.encode("client123:secret456");
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        );
        let form = IntrospectionForm {
            token,
            ..Default::default()
        };

        let (status, _, body) = call(headers, form).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["active"], true);
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_unauthorized() {
        let form = IntrospectionForm {
            token: issued_token().await,
            ..Default::default()
        };

        let (status, headers, body) = call(HeaderMap::new(), form).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(headers.contains_key(header::WWW_AUTHENTICATE));
        assert_eq!(body["error"], "invalid_client");
        assert!(body.get("sub").is_none());
    }

    #[tokio::test]
    async fn test_wrong_caller_secret_is_unauthorized() {
        let mut form = form(&issued_token().await);
        form.client_secret = Some("wrong".to_string());

        let (status, _, body) = call(HeaderMap::new(), form).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_client");
    }

    #[tokio::test]
    async fn test_signed_active_claim_does_not_override_flag() {
        let claims = ClaimSet::new().with_subject("client123").with("active", false);
        let token = encode(&claims, &Key::hmac("shared-secret"), SigningAlgorithm::HS256).unwrap();

        let (_, body) = introspect(&token).await;
        assert_eq!(body["active"], true);
        assert_eq!(body["sub"], "client123");
    }

    #[tokio::test]
    async fn test_foreign_signature_is_inactive() {
        let claims = ClaimSet::new().with_subject("client123");
        let token = encode(&claims, &Key::hmac("wrong-secret"), SigningAlgorithm::HS256).unwrap();

        let (status, body) = introspect(&token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"active": false}));
    }

    #[tokio::test]
    async fn test_expired_token_is_inactive() {
        let claims = ClaimSet::new().with_subject("client123").with_expiration(1);
        let token = encode(&claims, &Key::hmac("shared-secret"), SigningAlgorithm::HS256).unwrap();

        let (_, body) = introspect(&token).await;
        assert_eq!(body, serde_json::json!({"active": false}));
    }

    #[tokio::test]
    async fn test_garbage_is_inactive() {
        let (_, body) = introspect("not-a-token").await;
        assert_eq!(body["active"], false);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (status, body) = introspect("").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
    }
}
