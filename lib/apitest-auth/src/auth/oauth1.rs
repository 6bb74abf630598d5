//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

use super::error::AuthenticationError;
use super::target::{OAuth1Params, SignaturePlacement};

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const VERSION: &str = "1.0";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// RFC 3986 unreserved characters are left as is.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

type HmacSha1 = Hmac<Sha1>;

pub(crate) struct OAuth1Signer<'a> {
    params: &'a OAuth1Params,
    nonce: String,
    timestamp: u64,
}

impl<'a> OAuth1Signer<'a> {
    pub(crate) fn new(params: &'a OAuth1Params) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        Self {
            params,
            nonce,
            timestamp,
        }
    }

    #[cfg(test)]
    fn with_nonce(params: &'a OAuth1Params, nonce: &str, timestamp: u64) -> Self {
        Self {
            params,
            nonce: nonce.to_string(),
            timestamp,
        }
    }

    /// Signs the request, either through the `Authorization` header or the query string.
    pub(crate) fn sign(&self, request: &mut reqwest::Request) -> Result<(), AuthenticationError> {
        let mut protocol = self.protocol_params();
        let signature = self.signature(request, &protocol)?;
        protocol.push(("oauth_signature", signature));

        match self.params.placement {
            SignaturePlacement::Header => {
                let value = protocol
                    .iter()
                    .map(|(key, value)| format!("{key}=\"{}\"", encode(value)))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut header = HeaderValue::from_str(&format!("OAuth {value}")).map_err(|err| {
                    AuthenticationError::OAuth1Signing {
                        message: err.to_string(),
                    }
                })?;
                header.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, header);
            }
            SignaturePlacement::QueryString => {
                let mut pairs = request.url_mut().query_pairs_mut();
                for (key, value) in &protocol {
                    pairs.append_pair(key, value);
                }
            }
        }

        Ok(())
    }

    fn protocol_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("oauth_consumer_key", self.params.consumer_key.clone()),
            ("oauth_nonce", self.nonce.clone()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", self.timestamp.to_string()),
        ];
        if !self.params.access_token.is_empty() {
            params.push(("oauth_token", self.params.access_token.clone()));
        }
        params.push(("oauth_version", VERSION.to_string()));
        params
    }

    fn signature(
        &self,
        request: &reqwest::Request,
        protocol: &[(&'static str, String)],
    ) -> Result<String, AuthenticationError> {
        let base = signature_base_string(request, protocol)?;
        let key = format!(
            "{}&{}",
            encode(self.params.consumer_secret.expose()),
            encode(self.params.token_secret.expose())
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes()).map_err(|err| {
            AuthenticationError::OAuth1Signing {
                message: err.to_string(),
            }
        })?;
        mac.update(base.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

fn signature_base_string(
    request: &reqwest::Request,
    protocol: &[(&'static str, String)],
) -> Result<String, AuthenticationError> {
    let url = request.url();

    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (encode(&key), encode(&value)))
        .collect();
    for (key, value) in form_params(request)? {
        params.push((encode(&key), encode(&value)));
    }
    for (key, value) in protocol {
        params.push((encode(key), encode(value)));
    }
    params.sort();

    let normalized = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let port = url.port().map(|port| format!(":{port}")).unwrap_or_default();
    let base_url = format!("{}://{host}{port}{}", url.scheme(), url.path());

    Ok(format!(
        "{}&{}&{}",
        request.method().as_str().to_ascii_uppercase(),
        encode(&base_url),
        encode(&normalized)
    ))
}

fn form_params(request: &reqwest::Request) -> Result<Vec<(String, String)>, AuthenticationError> {
    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));
    let Some(body) = request.body().and_then(reqwest::Body::as_bytes) else {
        return Ok(Vec::new());
    };
    if !is_form {
        return Ok(Vec::new());
    }

    serde_urlencoded::from_bytes(body).map_err(|err| AuthenticationError::OAuth1Signing {
        message: format!("cannot read form body: {err}"),
    })
}
