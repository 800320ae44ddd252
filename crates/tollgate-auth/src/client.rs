//! HTTP client for the client credentials grant.
//!
//! Requests access tokens from a remote token endpoint, this server's or any
//! RFC 6749 compliant one.
//!
//! # Example
//!
//! ```ignore
//! let client = ClientCredentialsClient::new("https://auth.example.com/auth/token")?;
//! let token = client.request_token("client123", "secret456").await?;
//! println!("expires in {}s", token.expires_in);
//! ```

use std::time::Duration;

use tracing::debug;

use crate::oauth::token::{TokenError, TokenRequest, TokenResponse};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors returned by [`ClientCredentialsClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response not read.
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an OAuth error body.
    #[error("Token endpoint returned {}: {}", .error.error, .error.error_description.as_deref().unwrap_or("no description"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// The parsed error body.
        error: TokenError,
    },

    /// The server answered with a non-success status and no OAuth error body.
    #[error("HTTP error: status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// A success response could not be parsed.
    #[error("Failed to parse token response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Returns `true` if the server rejected the client credentials.
    #[must_use]
    pub fn is_invalid_client(&self) -> bool {
        matches!(
            self,
            Self::Server { error, .. } if error.error == crate::oauth::TokenErrorCode::InvalidClient
        )
    }
}

/// Requests access tokens with the client credentials grant.
#[derive(Debug, Clone)]
pub struct ClientCredentialsClient {
    http_client: reqwest::Client,
    token_url: String,
    basic_auth: bool,
}

impl ClientCredentialsClient {
    /// Creates a client for `token_url` with [`DEFAULT_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns `Http` if the underlying HTTP client cannot be built.
    pub fn new(token_url: impl Into<String>) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self::with_http_client(http_client, token_url))
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(http_client: reqwest::Client, token_url: impl Into<String>) -> Self {
        Self {
            http_client,
            token_url: token_url.into(),
            basic_auth: false,
        }
    }

    /// Sends credentials in an HTTP Basic header instead of the form body.
    #[must_use]
    pub fn with_basic_auth(mut self) -> Self {
        self.basic_auth = true;
        self
    }

    /// The token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Requests an access token.
    ///
    /// # Errors
    ///
    /// - `Server` if the endpoint returns an OAuth error body
    /// - `Status` for other non-success responses
    /// - `Http` on network failure
    /// - `Decode` if a success body is not a token response
    pub async fn request_token(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, ClientError> {
        debug!(client_id = %client_id, token_url = %self.token_url, "Requesting access token");

        let request = if self.basic_auth {
            let form = TokenRequest::client_credentials_grant();
            self.http_client
                .post(&self.token_url)
                .basic_auth(client_id, Some(client_secret))
                .form(&form)
        } else {
            let form = TokenRequest::client_credentials(client_id, client_secret);
            self.http_client.post(&self.token_url).form(&form)
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Ok(error) = serde_json::from_str::<TokenError>(&body) {
                return Err(ClientError::Server {
                    status: status.as_u16(),
                    error,
                });
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
