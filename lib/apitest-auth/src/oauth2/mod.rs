//! OAuth2 client-credentials support: token records, the token endpoint
//! client and the shared token cache.

mod cache;
mod credentials;
mod error;
mod issuer;
mod token;

pub use self::cache::OAuth2TokenCache;
pub use self::credentials::{CredentialDelivery, OAuth2Credentials};
pub use self::error::{TokenFetchError, TokenUnavailable};
pub use self::issuer::{HttpTokenIssuer, TokenIssuer};
pub use self::token::{Clock, REFRESH_MARGIN_SECS, SystemClock, TokenRecord};
