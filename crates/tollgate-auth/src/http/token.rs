//! Token endpoint handler.
//!
//! `POST /auth/token` with an `application/x-www-form-urlencoded` body.
//!
//! ```text
//! POST /auth/token
//! Content-Type: application/x-www-form-urlencoded
//! Authorization: Basic <base64(client_id:client_secret)>
//!
//! grant_type=client_credentials
//! ```

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::http::AuthRouterState;
use crate::oauth::token::{CLIENT_CREDENTIALS, TokenError, TokenRequest, TokenResponse};

/// Token endpoint handler.
///
/// Clients authenticate with an HTTP Basic `Authorization` header or with
/// `client_id` and `client_secret` in the body. The header wins when both are
/// present.
///
/// # Responses
///
/// - 200 with a [`TokenResponse`]
/// - 400 `invalid_request` for a missing `grant_type` or credentials
/// - 400 `unsupported_grant_type` for any grant but `client_credentials`
/// - 401 `invalid_client` for unknown clients and wrong secrets
pub async fn token_handler(
    State(state): State<AuthRouterState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    debug!(
        grant_type = %request.grant_type,
        client_id = ?request.client_id,
        "Processing token request"
    );

    if request.grant_type.is_empty() {
        return token_error_response(&TokenError::invalid_request(
            "Missing required 'grant_type' parameter",
        ));
    }

    let Some((client_id, client_secret)) = extract_client_auth(
        &headers,
        request.client_id.as_deref(),
        request.client_secret.as_deref(),
    ) else {
        if request.grant_type != CLIENT_CREDENTIALS {
            return auth_error_response(&AuthError::unsupported_grant(&request.grant_type));
        }
        return token_error_response(&TokenError::invalid_request(
            "Missing client credentials",
        ));
    };

    match state
        .issuer
        .issue(&client_id, &client_secret, &request.grant_type)
        .await
    {
        Ok(response) => token_success_response(response),
        Err(e) => {
            warn!(
                client_id = %client_id,
                grant_type = %request.grant_type,
                error = %e,
                "Token request failed"
            );
            auth_error_response(&e)
        }
    }
}

/// Extracts `(client_id, client_secret)` from the Basic header or the body.
pub(crate) fn extract_client_auth(
    headers: &HeaderMap,
    client_id: Option<&str>,
    client_secret: Option<&str>,
) -> Option<(String, String)> {
    if let Some(credentials) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_auth)
    {
        return Some(credentials);
    }

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => {
            Some((client_id.to_string(), client_secret.to_string()))
        }
        _ => None,
    }
}

/// Parses `Basic <base64(client_id:client_secret)>`.
pub(crate) fn parse_basic_auth(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = decoded.split_once(':')?;
    Some((client_id.to_string(), client_secret.to_string()))
}

fn token_success_response(response: TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(response),
    )
        .into_response()
}

pub(crate) fn auth_error_response(error: &AuthError) -> Response {
    token_error_response(&TokenError::from(error))
}

pub(crate) fn token_error_response(error: &TokenError) -> Response {
    let status = StatusCode::from_u16(error.error.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut response = (
        status,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(error),
    )
        .into_response();

    // RFC 6749 Section 5.2: 401 responses carry the scheme the client used.
    if status == StatusCode::UNAUTHORIZED {
        response.headers_mut().insert(
            header::WWW_AUTHENTICATE,
            header::HeaderValue::from_static("Basic"),
        );
    }
    response
}
