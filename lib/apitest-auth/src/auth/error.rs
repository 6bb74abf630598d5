use crate::oauth2::TokenUnavailable;

/// Errors that prevent a request from being authenticated.
///
/// Disabled or unsupported strategies are not errors, see
/// [`AuthOutcome`](crate::AuthOutcome).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum AuthenticationError {
    /// No OAuth2 token could be obtained.
    #[display("{_0}")]
    TokenUnavailable(TokenUnavailable),

    /// A configured header name is not a valid HTTP header name.
    #[display("Invalid header name '{name}': {message}")]
    #[from(skip)]
    InvalidHeaderName {
        /// The header name.
        name: String,
        /// Why it is invalid.
        message: String,
    },

    /// A configured header value contains invalid characters.
    #[display("Header '{name}' contains invalid characters: {message}")]
    #[from(skip)]
    InvalidHeaderValue {
        /// The header name.
        name: String,
        /// Why the value is invalid.
        message: String,
    },

    /// Basic authentication username contains a colon.
    #[display("Basic auth username cannot contain a colon: '{username}'")]
    #[from(skip)]
    InvalidUsername {
        /// The rejected username.
        username: String,
    },

    /// Bearer token contains characters not allowed in a header.
    #[display("Bearer token contains invalid characters")]
    #[from(skip)]
    InvalidBearerToken,

    /// OAuth1 signature computation failed.
    #[display("OAuth1 signing failed: {message}")]
    #[from(skip)]
    OAuth1Signing {
        /// Description of the failure.
        message: String,
    },

    /// Sending the authenticated request failed.
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),
}
