//! # apitest-auth
//!
//! Configuration-driven authentication for API test clients.
//!
//! Settings are read by name from an override store (usually the process
//! environment) and a property store, then turned into exactly one
//! authentication strategy for each outgoing request:
//!
//! | `AUTH_TYPE`  | Effect                                                      |
//! |--------------|-------------------------------------------------------------|
//! | `header`     | `{HEADER_AUTH_NAME}: {HEADER_AUTH_TYPE} {HEADER_AUTH_TOKEN}` |
//! | `basic`      | HTTP Basic, sent when the server challenges (default)       |
//! | `preemptive` | HTTP Basic, sent with the first request                     |
//! | `oauth1`     | OAuth 1.0a HMAC-SHA1 signature in the `Authorization` header |
//! | `oauth2`     | Bearer token from the client-credentials grant              |
//! | `none`       | Nothing                                                     |
//!
//! Authentication only happens when `IS_AUTH` is `true`. The names of every
//! setting are listed in [`keys`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apitest_auth::{AuthSettings, RequestAuth, apply_authentication};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Resolve settings from the environment, once for the whole test run
//! let settings = AuthSettings::from_env();
//!
//! let mut auth = RequestAuth::new();
//! let outcome = apply_authentication(&settings, &mut auth).await?;
//! println!("{outcome:?}");
//!
//! let client = reqwest::Client::new();
//! let request = client.get("https://api.example.com/users").build()?;
//! let response = auth.execute(&client, request).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## OAuth2 tokens
//!
//! The `oauth2` strategy shares one [`OAuth2TokenCache`] per [`AuthSettings`].
//! A token is reused until 20 seconds before it expires
//! ([`REFRESH_MARGIN_SECS`]); concurrent callers that find it stale trigger a
//! single call to the token endpoint.
//!
//! ## Error Handling
//!
//! - Disabled, unsupported or misconfigured strategies are not errors: they
//!   are logged and reported as an [`AuthOutcome`].
//! - [`AuthenticationError`] is returned when a token cannot be obtained or
//!   when the authentication cannot be written onto a request.
//! - [`ConfigurationError`] describes an invalid setting.

mod auth;
mod config;
mod oauth2;

pub use self::auth::{
    AuthOutcome, AuthScheme, AuthStrategy, AuthTarget, AuthenticationError, OAuth1Params,
    RequestAuth, Secret, SignaturePlacement, StrategySelection, UnsupportedStrategy,
    apply_authentication,
};
pub use self::config::{
    AuthSettings, BasicCredentials, ConfigResolver, ConfigSource, ConfigurationError, EnvSource,
    HeaderCredentials, PropertyStore, keys,
};
pub use self::oauth2::{
    Clock, CredentialDelivery, HttpTokenIssuer, OAuth2Credentials, OAuth2TokenCache,
    REFRESH_MARGIN_SECS, SystemClock, TokenFetchError, TokenIssuer, TokenRecord, TokenUnavailable,
};
