//! OAuth2 client credentials.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::auth::Secret;
use crate::config::keys::{
    OAUTH2_CLIENT_AUTH, OAUTH2_CLIENT_ID, OAUTH2_CLIENT_SECRET, OAUTH2_SCOPE, OAUTH2_TOKEN_URL,
};
use crate::config::{ConfigResolver, ConfigurationError};

/// Client credentials for the OAuth2 client-credentials grant.
///
/// Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuth2Credentials {
    client_id: String,
    client_secret: Secret,
    token_url: Url,
    scope: Option<String>,
}

impl OAuth2Credentials {
    /// Creates credentials for the given token endpoint.
    ///
    /// # Errors
    ///
    /// Fails when `token_url` is not a valid URL.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<Secret>,
        token_url: impl AsRef<str>,
    ) -> Result<Self, ConfigurationError> {
        let raw = token_url.as_ref();
        let token_url = Url::parse(raw).map_err(|err| ConfigurationError::InvalidUrl {
            key: OAUTH2_TOKEN_URL,
            value: raw.to_string(),
            message: err.to_string(),
        })?;

        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url,
            scope: None,
        })
    }

    /// Sets the requested scope, a blank scope is ignored.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.scope = (!scope.trim().is_empty()).then_some(scope);
        self
    }

    /// Reads the credentials from the `OAUTH2_*` settings.
    ///
    /// # Errors
    ///
    /// Fails when `OAUTH2_TOKEN_URL` is missing or invalid.
    pub fn resolve(resolver: &ConfigResolver) -> Result<Self, ConfigurationError> {
        let token_url = resolver
            .resolve(OAUTH2_TOKEN_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigurationError::Missing {
                key: OAUTH2_TOKEN_URL,
            })?;
        let credentials = Self::new(
            resolver.resolve_or(OAUTH2_CLIENT_ID, ""),
            resolver.resolve_or(OAUTH2_CLIENT_SECRET, ""),
            token_url.trim(),
        )?;

        Ok(match resolver.resolve(OAUTH2_SCOPE) {
            Some(scope) => credentials.with_scope(scope),
            None => credentials,
        })
    }

    /// The client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret.
    pub fn client_secret(&self) -> &Secret {
        &self.client_secret
    }

    /// The token endpoint.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// The requested scope, if any.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl fmt::Debug for OAuth2Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("token_url", &self.token_url.as_str())
            .field("scope", &self.scope)
            .finish()
    }
}

/// How the client credentials reach the token endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialDelivery {
    /// `client_id` and `client_secret` form fields.
    #[default]
    RequestBody,
    /// HTTP Basic credentials, sent preemptively.
    BasicAuth,
}

impl CredentialDelivery {
    const EXPECTED: &'static str = "body, basic";

    /// Reads `OAUTH2_CLIENT_AUTH`, defaulting to [`Self::RequestBody`].
    ///
    /// # Errors
    ///
    /// Fails when the setting is neither `body` nor `basic`.
    pub fn resolve(resolver: &ConfigResolver) -> Result<Self, ConfigurationError> {
        match resolver.resolve(OAUTH2_CLIENT_AUTH) {
            Some(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Self::default()),
        }
    }

    /// Returns `true` when the credentials go in the form body.
    pub const fn in_body(self) -> bool {
        matches!(self, Self::RequestBody)
    }
}

impl FromStr for CredentialDelivery {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(Self::RequestBody),
            "basic" => Ok(Self::BasicAuth),
            _ => Err(ConfigurationError::UnsupportedValue {
                key: OAUTH2_CLIENT_AUTH,
                value: value.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}
