//! Token endpoint client for the client-credentials grant.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::credentials::{CredentialDelivery, OAuth2Credentials};
use super::error::TokenFetchError;
use super::token::{Clock, SystemClock, TokenRecord};
use crate::config::ConfigurationError;

const GRANT_TYPE: &str = "client_credentials";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Obtains a fresh token from an authorization server.
///
/// Implementations own no cache, every call reaches the server.
pub trait TokenIssuer: Send + Sync {
    /// Performs the client-credentials grant.
    fn fetch(
        &self,
        credentials: &OAuth2Credentials,
        delivery: CredentialDelivery,
    ) -> impl Future<Output = Result<TokenRecord, TokenFetchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

/// [`TokenIssuer`] posting an `application/x-www-form-urlencoded` grant over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTokenIssuer {
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl Default for HttpTokenIssuer {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl HttpTokenIssuer {
    /// Creates an issuer on top of an existing HTTP client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates an issuer whose HTTP client gives up connecting after `timeout`.
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn with_connect_timeout(timeout: Duration) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(|err| ConfigurationError::HttpClient {
                message: err.to_string(),
            })?;
        Ok(Self::new(client))
    }

    /// Replaces the clock used to stamp issued tokens.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The clock used to stamp issued tokens.
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

impl TokenIssuer for HttpTokenIssuer {
    async fn fetch(
        &self,
        credentials: &OAuth2Credentials,
        delivery: CredentialDelivery,
    ) -> Result<TokenRecord, TokenFetchError> {
        let url = credentials.token_url();

        let mut form = vec![("grant_type", GRANT_TYPE)];
        if delivery.in_body() {
            form.push(("client_id", credentials.client_id()));
            form.push(("client_secret", credentials.client_secret().expose()));
        }
        if let Some(scope) = credentials.scope() {
            form.push(("scope", scope));
        }

        let mut builder = self.client.post(url.clone()).form(&form);
        if !delivery.in_body() {
            builder = builder.basic_auth(
                credentials.client_id(),
                Some(credentials.client_secret().expose()),
            );
        }

        debug!(%url, client_id = credentials.client_id(), ?delivery, "requesting OAuth2 token");
        let transport = |source| TokenFetchError::Transport {
            url: url.clone(),
            source,
        };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, %status, "token endpoint rejected the request");
            return Err(TokenFetchError::Status {
                url: url.clone(),
                status,
                body: truncate_body(body),
            });
        }

        let body = response.text().await.map_err(transport)?;

        let deserializer = &mut serde_json::Deserializer::from_str(&body);
        let token: TokenResponse = serde_path_to_error::deserialize(deserializer).map_err(|err| {
            TokenFetchError::InvalidResponse {
                path: err.path().to_string(),
                source: err.into_inner(),
            }
        })?;
        if token.access_token.is_empty() {
            return Err(TokenFetchError::EmptyAccessToken);
        }

        debug!(expires_in = token.expires_in, "OAuth2 token issued");
        Ok(TokenRecord::issued_at(
            token.access_token,
            token.expires_in,
            self.clock.now(),
        ))
    }
}

fn truncate_body(mut body: String) -> String {
    if let Some((index, _)) = body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        body.truncate(index);
        body.push('…');
    }
    body
}
