use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tollgate_auth::{AuthRouterState, TokenIssuer, introspect_handler, jwks_handler, token_handler};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

pub struct TollgateServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(issuer: Arc<TokenIssuer>, body_limit: usize) -> Router {
    let state = AuthRouterState::new(issuer);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/token", post(token_handler))
        .route("/auth/jwks", get(jwks_handler))
        .route("/auth/introspect", post(introspect_handler))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

async fn healthz() -> &'static str {
    "ok"
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Builds the issuer from the auth section and wires the routes.
    pub fn build(self) -> anyhow::Result<TollgateServer> {
        let issuer = self.config.auth.build_issuer()?;
        let app = build_app(Arc::new(issuer), self.config.server.body_limit_bytes);

        Ok(TollgateServer {
            addr: self.config.addr(),
            app,
        })
    }
}

impl TollgateServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tollgate_auth::config::{ClientConfig, SigningConfig};
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.issuer = "https://auth.example.com".to_string();
        cfg.auth.signing = SigningConfig {
            secret: Some("0123456789abcdef0123456789abcdef".to_string()),
            ..Default::default()
        };
        cfg.auth.clients = vec![ClientConfig {
            client_id: "client123".to_string(),
            secret: Some("secret456".to_string()),
            secret_hash: None,
            confidential: true,
        }];
        cfg
    }

    fn app() -> Router {
        let issuer = test_config().auth.build_issuer().unwrap();
        build_app(Arc::new(issuer), 64 * 1024)
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_issue_then_introspect() {
        let app = app();

        let response = app
            .clone()
            .oneshot(form_request(
                "/auth/token",
                "grant_type=client_credentials&client_id=client123&client_secret=secret456",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = json_body(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(form_request("/auth/introspect", &format!("token={token}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(form_request(
                "/auth/introspect",
                &format!("token={token}&client_id=client123&client_secret=secret456"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["active"], true);
        assert_eq!(body["sub"], "client123");
        assert_eq!(body["iss"], "https://auth.example.com");
    }

    #[tokio::test]
    async fn test_unknown_client_route() {
        let response = app()
            .oneshot(form_request(
                "/auth/token",
                "grant_type=client_credentials&client_id=ghost&client_secret=secret456",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "invalid_client");
    }

    #[tokio::test]
    async fn test_jwks_route() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/auth/jwks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["keys"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = app()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_builder_rejects_unbuildable_auth() {
        let mut cfg = test_config();
        cfg.auth.signing.secret = None;
        assert!(ServerBuilder::new().with_config(cfg).build().is_err());
    }
}
