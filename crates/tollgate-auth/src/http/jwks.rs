//! JWKS endpoint handler.
//!
//! Publishes the public half of the signing key so resource servers can
//! verify RS256 tokens. An HS256 deployment publishes an empty set.

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::http::AuthRouterState;

/// Handler for `GET /auth/jwks`.
pub async fn jwks_handler(State(state): State<AuthRouterState>) -> impl IntoResponse {
    let jwks = state.issuer.jwks();
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        Json(jwks),
    )
}
