//! Names of the settings read by [`AuthSettings`](crate::AuthSettings).
//!
//! The same name is looked up in the override store (usually the process
//! environment) and in the property store.

/// Enables authentication (`true`/`false`, default `false`).
pub const IS_AUTH: &str = "IS_AUTH";
/// Strategy identifier: `none`, `header`, `basic`, `preemptive`, `oauth1` or `oauth2` (default `basic`).
pub const AUTH_TYPE: &str = "AUTH_TYPE";

/// Header name for the `header` strategy (default `Authorization`).
pub const HEADER_AUTH_NAME: &str = "HEADER_AUTH_NAME";
/// Token type prefix for the `header` strategy (default `Bearer`).
pub const HEADER_AUTH_TYPE: &str = "HEADER_AUTH_TYPE";
/// Token for the `header` strategy.
pub const HEADER_AUTH_TOKEN: &str = "HEADER_AUTH_TOKEN";

/// Username for the `basic` strategy.
pub const BASIC_AUTH_USER: &str = "BASIC_AUTH_USER";
/// Password for the `basic` strategy.
pub const BASIC_AUTH_PASSWORD: &str = "BASIC_AUTH_PASSWORD";

/// Username for the `preemptive` strategy.
pub const PREEMPTIVE_AUTH_USER: &str = "PREEMPTIVE_AUTH_USER";
/// Password for the `preemptive` strategy.
pub const PREEMPTIVE_AUTH_PASSWORD: &str = "PREEMPTIVE_AUTH_PASSWORD";

/// OAuth1 consumer key.
pub const OAUTH1_KEY: &str = "OAUTH1_KEY";
/// OAuth1 consumer secret.
pub const OAUTH1_SECRET: &str = "OAUTH1_SECRET";
/// OAuth1 access token.
pub const OAUTH1_ACCESS_TOKEN: &str = "OAUTH1_ACCESS_TOKEN";
/// OAuth1 access token secret.
pub const OAUTH1_SECRET_TOKEN: &str = "OAUTH1_SECRET_TOKEN";

/// OAuth2 client identifier.
pub const OAUTH2_CLIENT_ID: &str = "OAUTH2_CLIENT_ID";
/// OAuth2 client secret.
pub const OAUTH2_CLIENT_SECRET: &str = "OAUTH2_CLIENT_SECRET";
/// OAuth2 token endpoint URL (required for the `oauth2` strategy).
pub const OAUTH2_TOKEN_URL: &str = "OAUTH2_TOKEN_URL";
/// Optional OAuth2 scope.
pub const OAUTH2_SCOPE: &str = "OAUTH2_SCOPE";
/// How client credentials reach the token endpoint: `body` (default) or `basic`.
pub const OAUTH2_CLIENT_AUTH: &str = "OAUTH2_CLIENT_AUTH";

/// Connect timeout in milliseconds (default `9000`).
pub const CONNECTION_TIMEOUT: &str = "CONNECTION_TIMEOUT";
