//! OAuth2-specific error types.

use http::StatusCode;
use url::Url;

/// The token endpoint did not yield a usable token.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum TokenFetchError {
    /// The request could not be sent or the response could not be read.
    #[display("Token request to '{url}' failed: {source}")]
    Transport {
        /// The token endpoint.
        url: Url,
        /// The transport error.
        source: reqwest::Error,
    },

    /// The token endpoint answered with a non-success status.
    #[display("Token endpoint '{url}' answered {status}: {body}")]
    Status {
        /// The token endpoint.
        url: Url,
        /// The response status.
        status: StatusCode,
        /// The response body, usually an OAuth2 error document, truncated when long.
        body: String,
    },

    /// The response body is not a valid token response.
    #[display("Invalid token response at '{path}': {source}")]
    InvalidResponse {
        /// JSON path of the failure.
        path: String,
        /// The decoding error.
        source: serde_json::Error,
    },

    /// The response carries an empty `access_token`.
    #[display("Token response has an empty access_token")]
    EmptyAccessToken,
}

/// No token can be handed out by the cache.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
#[display("OAuth2 token unavailable: {source}")]
pub struct TokenUnavailable {
    source: TokenFetchError,
}

impl TokenUnavailable {
    /// The fetch failure behind this error.
    pub fn cause(&self) -> &TokenFetchError {
        &self.source
    }
}
