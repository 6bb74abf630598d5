use std::sync::OnceLock;
use std::time::Duration;

use tracing::debug;

use super::error::ConfigurationError;
use super::keys::{
    AUTH_TYPE, BASIC_AUTH_PASSWORD, BASIC_AUTH_USER, CONNECTION_TIMEOUT, HEADER_AUTH_NAME,
    HEADER_AUTH_TOKEN, HEADER_AUTH_TYPE, IS_AUTH, OAUTH1_ACCESS_TOKEN, OAUTH1_KEY, OAUTH1_SECRET,
    OAUTH1_SECRET_TOKEN, PREEMPTIVE_AUTH_PASSWORD, PREEMPTIVE_AUTH_USER,
};
use super::source::ConfigResolver;
use crate::auth::{AuthStrategy, OAuth1Params, Secret, SignaturePlacement, StrategySelection};
use crate::oauth2::{CredentialDelivery, HttpTokenIssuer, OAuth2Credentials, OAuth2TokenCache};

const DEFAULT_HEADER_NAME: &str = "Authorization";
const DEFAULT_HEADER_TYPE: &str = "Bearer";
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 9_000;

/// Settings of the `header` strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCredentials {
    /// Header name.
    pub name: String,
    /// Token type, such as `Bearer`.
    pub scheme: String,
    /// The token.
    pub token: Secret,
}

impl HeaderCredentials {
    /// The header value `{scheme} {token}`, or the bare token when the scheme is blank.
    pub fn value(&self) -> Secret {
        let scheme = self.scheme.trim();
        if scheme.is_empty() {
            return self.token.clone();
        }
        Secret::new(format!("{scheme} {}", self.token.expose()))
    }
}

/// A username and password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    /// The username.
    pub username: String,
    /// The password.
    pub password: Secret,
}

/// Typed, lazily resolved authentication settings.
///
/// Each group of fields is resolved through the [`ConfigResolver`] on first
/// access and kept for the lifetime of the value: later changes to the
/// underlying stores are not observed. This includes the `IS_AUTH` flag.
/// Resolution is thread-safe, an `AuthSettings` can be shared across tasks.
///
/// # Example
///
/// ```rust
/// use apitest_auth::{AuthSettings, AuthStrategy, ConfigResolver, PropertyStore, StrategySelection};
///
/// let properties = PropertyStore::new()
///     .with("IS_AUTH", "true")
///     .with("AUTH_TYPE", "header")
///     .with("HEADER_AUTH_TOKEN", "abc-123");
/// let settings = AuthSettings::new(ConfigResolver::new().with_properties(properties));
///
/// assert_eq!(settings.is_auth(), Ok(true));
/// assert_eq!(
///     settings.strategy(),
///     &StrategySelection::Strategy(AuthStrategy::Header)
/// );
/// assert_eq!(settings.header().name, "Authorization");
/// assert_eq!(settings.header().value().expose(), "Bearer abc-123");
/// ```
#[derive(Debug, Default)]
pub struct AuthSettings {
    resolver: ConfigResolver,
    enabled: OnceLock<Result<bool, ConfigurationError>>,
    strategy: OnceLock<StrategySelection>,
    header: OnceLock<HeaderCredentials>,
    basic: OnceLock<BasicCredentials>,
    preemptive: OnceLock<BasicCredentials>,
    oauth1: OnceLock<OAuth1Params>,
    connection_timeout: OnceLock<Result<Duration, ConfigurationError>>,
    oauth2: OnceLock<Result<OAuth2TokenCache, ConfigurationError>>,
}

impl AuthSettings {
    /// Creates settings backed by `resolver`. Nothing is resolved yet.
    pub fn new(resolver: ConfigResolver) -> Self {
        Self {
            resolver,
            ..Self::default()
        }
    }

    /// Creates settings backed by the process environment only.
    pub fn from_env() -> Self {
        Self::new(ConfigResolver::from_env())
    }

    /// Uses an existing token cache for the `oauth2` strategy instead of
    /// building one from the `OAUTH2_*` settings.
    ///
    /// Replaces any cache already built by [`AuthSettings::oauth2_cache`].
    #[must_use]
    pub fn with_token_cache(mut self, cache: OAuth2TokenCache) -> Self {
        self.oauth2 = OnceLock::from(Ok(cache));
        self
    }

    /// Whether authentication is enabled (`IS_AUTH`, default `false`).
    ///
    /// # Errors
    ///
    /// Fails when `IS_AUTH` is not a recognized boolean.
    pub fn is_auth(&self) -> Result<bool, ConfigurationError> {
        self.enabled
            .get_or_init(|| match self.resolver.resolve(IS_AUTH) {
                Some(value) => parse_flag(IS_AUTH, &value),
                None => Ok(false),
            })
            .clone()
    }

    /// The configured strategy (`AUTH_TYPE`, default `basic`).
    pub fn strategy(&self) -> &StrategySelection {
        self.strategy.get_or_init(|| {
            let identifier = self.resolver.resolve_or(AUTH_TYPE, AuthStrategy::Basic.as_str());
            StrategySelection::parse(&identifier)
        })
    }

    /// Settings of the `header` strategy.
    pub fn header(&self) -> &HeaderCredentials {
        self.header.get_or_init(|| HeaderCredentials {
            name: self.resolver.resolve_or(HEADER_AUTH_NAME, DEFAULT_HEADER_NAME),
            scheme: self.resolver.resolve_or(HEADER_AUTH_TYPE, DEFAULT_HEADER_TYPE),
            token: self.secret(HEADER_AUTH_TOKEN),
        })
    }

    /// Credentials of the challenge-driven `basic` strategy.
    pub fn basic(&self) -> &BasicCredentials {
        self.basic.get_or_init(|| BasicCredentials {
            username: self.resolver.resolve_or(BASIC_AUTH_USER, ""),
            password: self.secret(BASIC_AUTH_PASSWORD),
        })
    }

    /// Credentials of the `preemptive` strategy.
    pub fn preemptive(&self) -> &BasicCredentials {
        self.preemptive.get_or_init(|| BasicCredentials {
            username: self.resolver.resolve_or(PREEMPTIVE_AUTH_USER, ""),
            password: self.secret(PREEMPTIVE_AUTH_PASSWORD),
        })
    }

    /// Signing material of the `oauth1` strategy, signature in the header.
    pub fn oauth1(&self) -> &OAuth1Params {
        self.oauth1.get_or_init(|| OAuth1Params {
            consumer_key: self.resolver.resolve_or(OAUTH1_KEY, ""),
            consumer_secret: self.secret(OAUTH1_SECRET),
            access_token: self.resolver.resolve_or(OAUTH1_ACCESS_TOKEN, ""),
            token_secret: self.secret(OAUTH1_SECRET_TOKEN),
            placement: SignaturePlacement::Header,
        })
    }

    /// Connect timeout for the token endpoint (`CONNECTION_TIMEOUT` in milliseconds, default 9s).
    ///
    /// # Errors
    ///
    /// Fails when `CONNECTION_TIMEOUT` is not a non-negative integer.
    pub fn connection_timeout(&self) -> Result<Duration, ConfigurationError> {
        self.connection_timeout
            .get_or_init(|| {
                let Some(raw) = self.resolver.resolve(CONNECTION_TIMEOUT) else {
                    return Ok(Duration::from_millis(DEFAULT_CONNECTION_TIMEOUT_MS));
                };
                raw.trim()
                    .parse::<u64>()
                    .map(Duration::from_millis)
                    .map_err(|err| ConfigurationError::InvalidNumber {
                        key: CONNECTION_TIMEOUT,
                        value: raw.clone(),
                        message: err.to_string(),
                    })
            })
            .clone()
    }

    /// The token cache of the `oauth2` strategy, built on first access.
    ///
    /// # Errors
    ///
    /// Fails when the `OAUTH2_*` settings or `CONNECTION_TIMEOUT` are invalid.
    pub fn oauth2_cache(&self) -> Result<&OAuth2TokenCache, ConfigurationError> {
        self.oauth2
            .get_or_init(|| self.build_token_cache())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn build_token_cache(&self) -> Result<OAuth2TokenCache, ConfigurationError> {
        let credentials = OAuth2Credentials::resolve(&self.resolver)?;
        let delivery = CredentialDelivery::resolve(&self.resolver)?;
        let issuer = HttpTokenIssuer::with_connect_timeout(self.connection_timeout()?)?;
        debug!(?credentials, ?delivery, "OAuth2 token cache created");

        let clock = issuer.clock();
        Ok(OAuth2TokenCache::new(credentials, delivery, issuer, clock))
    }

    fn secret(&self, key: &str) -> Secret {
        Secret::new(self.resolver.resolve_or(key, ""))
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigurationError::InvalidFlag {
            key,
            value: value.to_string(),
        }),
    }
}
