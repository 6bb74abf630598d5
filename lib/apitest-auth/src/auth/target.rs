use headers::authorization::{Basic, Bearer};
use headers::{Authorization, HeaderMapExt};
use http::StatusCode;
use http::header::{HeaderName, HeaderValue, WWW_AUTHENTICATE};
use indexmap::IndexMap;
use tracing::debug;

use super::error::AuthenticationError;
use super::oauth1::OAuth1Signer;
use super::secret::Secret;

/// Where the OAuth1 signature and protocol parameters are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignaturePlacement {
    /// `Authorization: OAuth ...` header.
    #[default]
    Header,
    /// `oauth_*` query parameters.
    QueryString,
}

/// OAuth1 signing material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuth1Params {
    /// Consumer key.
    pub consumer_key: String,
    /// Consumer secret.
    pub consumer_secret: Secret,
    /// Access token, omitted from the request when empty.
    pub access_token: String,
    /// Access token secret.
    pub token_secret: Secret,
    /// Where the signature goes.
    pub placement: SignaturePlacement,
}

/// An outgoing request that authentication can be attached to.
///
/// Implementations must give every method replace semantics: setting a header
/// twice keeps a single header, setting an auth scheme replaces the previous one.
pub trait AuthTarget {
    /// Sets a header.
    fn add_header(&mut self, name: String, value: Secret);

    /// Uses HTTP Basic credentials, sent once the server challenges.
    fn set_basic_auth(&mut self, username: String, password: Secret);

    /// Uses HTTP Basic credentials, sent with the first request.
    fn set_preemptive_basic_auth(&mut self, username: String, password: Secret);

    /// Signs the request with OAuth1.
    fn set_oauth1(&mut self, params: OAuth1Params);

    /// Uses an OAuth2 bearer token.
    fn set_oauth2_bearer(&mut self, token: Secret);
}

/// The single authentication scheme of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    /// HTTP Basic credentials.
    Basic {
        /// The username.
        username: String,
        /// The password.
        password: Secret,
        /// Send without waiting for a challenge.
        preemptive: bool,
    },
    /// OAuth1 signature.
    OAuth1(OAuth1Params),
    /// OAuth2 bearer token.
    Bearer(Secret),
}

/// Authentication collected for a request, ready to be rendered onto a [`reqwest::Request`].
///
/// # Example
///
/// ```rust
/// use apitest_auth::{AuthTarget, RequestAuth};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut auth = RequestAuth::new();
/// auth.add_header("X-Api-Key".to_string(), "abc-123".into());
///
/// let mut request = reqwest::Request::new(
///     reqwest::Method::GET,
///     "https://api.example.com/items".parse()?,
/// );
/// auth.authorize(&mut request)?;
///
/// assert_eq!(request.headers()["x-api-key"], "abc-123");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestAuth {
    headers: IndexMap<String, (String, Secret)>,
    scheme: Option<AuthScheme>,
}

impl RequestAuth {
    /// Creates an empty request authentication.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when nothing has been attached.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.scheme.is_none()
    }

    /// The attached headers, in insertion order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &Secret)> {
        self.headers
            .values()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// The attached authentication scheme.
    pub fn scheme(&self) -> Option<&AuthScheme> {
        self.scheme.as_ref()
    }

    /// Adds the headers, preemptive credentials and signature to `request`.
    ///
    /// Challenge-driven Basic credentials are not added here, see [`Self::execute`].
    ///
    /// # Errors
    ///
    /// Fails when a header name or value is invalid, when a Basic username
    /// contains a colon, or when the OAuth1 signature cannot be computed.
    pub fn authorize(&self, request: &mut reqwest::Request) -> Result<(), AuthenticationError> {
        for (name, value) in self.headers.values() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
                AuthenticationError::InvalidHeaderName {
                    name: name.clone(),
                    message: err.to_string(),
                }
            })?;
            let mut header_value = HeaderValue::from_str(value.expose()).map_err(|err| {
                AuthenticationError::InvalidHeaderValue {
                    name: name.clone(),
                    message: err.to_string(),
                }
            })?;
            header_value.set_sensitive(true);
            request.headers_mut().insert(header_name, header_value);
        }

        match &self.scheme {
            None
            | Some(AuthScheme::Basic {
                preemptive: false, ..
            }) => {}
            Some(AuthScheme::Basic {
                username,
                password,
                preemptive: true,
            }) => {
                request
                    .headers_mut()
                    .typed_insert(basic_authorization(username, password)?);
            }
            Some(AuthScheme::Bearer(token)) => {
                let bearer = Authorization::<Bearer>::bearer(token.expose())
                    .map_err(|_| AuthenticationError::InvalidBearerToken)?;
                request.headers_mut().typed_insert(bearer);
            }
            Some(AuthScheme::OAuth1(params)) => {
                OAuth1Signer::new(params).sign(request)?;
            }
        }

        Ok(())
    }

    /// Authorizes and sends `request`.
    ///
    /// With challenge-driven Basic credentials, the request first goes out
    /// without credentials; a `401` carrying a `WWW-Authenticate: Basic`
    /// challenge triggers a single replay with the credentials. Requests with
    /// a streaming body cannot be replayed and return the `401` as is.
    ///
    /// # Errors
    ///
    /// Fails when [`Self::authorize`] fails or when the transport fails.
    pub async fn execute(
        &self,
        client: &reqwest::Client,
        mut request: reqwest::Request,
    ) -> Result<reqwest::Response, AuthenticationError> {
        self.authorize(&mut request)?;

        let Some(AuthScheme::Basic {
            username,
            password,
            preemptive: false,
        }) = &self.scheme
        else {
            return Ok(client.execute(request).await?);
        };

        let credentials = basic_authorization(username, password)?;
        let replay = request.try_clone();
        let response = client.execute(request).await?;
        if response.status() != StatusCode::UNAUTHORIZED || !is_basic_challenge(&response) {
            return Ok(response);
        }

        let Some(mut replay) = replay else {
            debug!("cannot replay a streaming body, returning the Basic challenge");
            return Ok(response);
        };
        debug!(%username, "answering Basic challenge");
        replay.headers_mut().typed_insert(credentials);

        Ok(client.execute(replay).await?)
    }
}

impl AuthTarget for RequestAuth {
    fn add_header(&mut self, name: String, value: Secret) {
        self.headers
            .insert(name.to_ascii_lowercase(), (name, value));
    }

    fn set_basic_auth(&mut self, username: String, password: Secret) {
        self.scheme = Some(AuthScheme::Basic {
            username,
            password,
            preemptive: false,
        });
    }

    fn set_preemptive_basic_auth(&mut self, username: String, password: Secret) {
        self.scheme = Some(AuthScheme::Basic {
            username,
            password,
            preemptive: true,
        });
    }

    fn set_oauth1(&mut self, params: OAuth1Params) {
        self.scheme = Some(AuthScheme::OAuth1(params));
    }

    fn set_oauth2_bearer(&mut self, token: Secret) {
        self.scheme = Some(AuthScheme::Bearer(token));
    }
}

fn basic_authorization(
    username: &str,
    password: &Secret,
) -> Result<Authorization<Basic>, AuthenticationError> {
    if username.contains(':') {
        return Err(AuthenticationError::InvalidUsername {
            username: username.to_string(),
        });
    }
    Ok(Authorization::basic(username, password.expose()))
}

fn is_basic_challenge(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|challenge| {
            challenge
                .split_whitespace()
                .next()
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("basic"))
        })
}
