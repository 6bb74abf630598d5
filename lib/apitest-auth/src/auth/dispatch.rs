use tracing::{debug, warn};

use super::error::AuthenticationError;
use super::strategy::{AuthStrategy, StrategySelection, UnsupportedStrategy};
use super::target::AuthTarget;
use crate::config::{AuthSettings, ConfigurationError};

/// The transition taken by [`apply_authentication`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The strategy was attached to the target.
    Applied(AuthStrategy),
    /// `IS_AUTH` is off.
    Disabled,
    /// `AUTH_TYPE` is blank.
    Empty,
    /// `AUTH_TYPE` is `none`.
    ExplicitNone,
    /// `AUTH_TYPE` names no known strategy.
    Unsupported(UnsupportedStrategy),
    /// A setting needed by the strategy is invalid.
    Misconfigured(ConfigurationError),
}

impl AuthOutcome {
    /// Returns `true` when the target was mutated.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Attaches the configured authentication strategy to `target`.
///
/// At most one strategy is applied. A disabled, blank, `none`, unsupported
/// or misconfigured strategy leaves `target` untouched and is reported
/// through the returned [`AuthOutcome`] and a log line, not as an error.
/// Every strategy but `oauth2` is idempotent on targets with replace
/// semantics such as [`RequestAuth`](crate::RequestAuth).
///
/// # Errors
///
/// Fails only when the `oauth2` strategy cannot obtain a token.
///
/// # Example
///
/// ```rust
/// use apitest_auth::{
///     AuthOutcome, AuthSettings, AuthStrategy, ConfigResolver, PropertyStore, RequestAuth,
///     apply_authentication,
/// };
///
/// # async fn example() -> Result<(), apitest_auth::AuthenticationError> {
/// let properties = PropertyStore::new()
///     .with("IS_AUTH", "true")
///     .with("AUTH_TYPE", "preemptive")
///     .with("PREEMPTIVE_AUTH_USER", "alice")
///     .with("PREEMPTIVE_AUTH_PASSWORD", "s3cret");
/// let settings = AuthSettings::new(ConfigResolver::new().with_properties(properties));
///
/// let mut auth = RequestAuth::new();
/// let outcome = apply_authentication(&settings, &mut auth).await?;
///
/// assert_eq!(outcome, AuthOutcome::Applied(AuthStrategy::Preemptive));
/// # Ok(())
/// # }
/// ```
pub async fn apply_authentication<T>(
    settings: &AuthSettings,
    target: &mut T,
) -> Result<AuthOutcome, AuthenticationError>
where
    T: AuthTarget + ?Sized,
{
    match settings.is_auth() {
        Ok(true) => {}
        Ok(false) => {
            debug!("auth skipped");
            return Ok(AuthOutcome::Disabled);
        }
        Err(err) => {
            warn!(%err, "auth skipped, invalid setting");
            return Ok(AuthOutcome::Misconfigured(err));
        }
    }

    let strategy = match settings.strategy() {
        StrategySelection::Strategy(strategy) => *strategy,
        StrategySelection::Empty => {
            debug!("no authentication strategy configured");
            return Ok(AuthOutcome::Empty);
        }
        StrategySelection::Unsupported(unsupported) => {
            warn!(identifier = %unsupported.identifier, "unsupported authentication strategy, no auth applied");
            return Ok(AuthOutcome::Unsupported(unsupported.clone()));
        }
    };

    match strategy {
        AuthStrategy::None => {
            debug!("authentication explicitly disabled");
            return Ok(AuthOutcome::ExplicitNone);
        }
        AuthStrategy::Header => {
            let header = settings.header();
            target.add_header(header.name.clone(), header.value());
        }
        AuthStrategy::Basic => {
            let basic = settings.basic();
            target.set_basic_auth(basic.username.clone(), basic.password.clone());
        }
        AuthStrategy::Preemptive => {
            let preemptive = settings.preemptive();
            target.set_preemptive_basic_auth(
                preemptive.username.clone(),
                preemptive.password.clone(),
            );
        }
        AuthStrategy::OAuth1 => {
            target.set_oauth1(settings.oauth1().clone());
        }
        AuthStrategy::OAuth2 => {
            let cache = match settings.oauth2_cache() {
                Ok(cache) => cache,
                Err(err) => {
                    warn!(%err, "OAuth2 is misconfigured, no auth applied");
                    return Ok(AuthOutcome::Misconfigured(err));
                }
            };
            let token = cache.get_token().await?;
            target.set_oauth2_bearer(token);
        }
    }

    debug!(%strategy, "authentication applied");
    Ok(AuthOutcome::Applied(strategy))
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{AuthScheme, RequestAuth, Secret, SignaturePlacement};
    use crate::config::{ConfigResolver, PropertyStore};

    fn settings(properties: &[(&str, &str)]) -> AuthSettings {
        let store: PropertyStore = properties.iter().copied().collect();
        AuthSettings::new(ConfigResolver::new().with_properties(store))
    }

    async fn apply(settings: &AuthSettings) -> (AuthOutcome, RequestAuth) {
        let mut auth = RequestAuth::new();
        let outcome = apply_authentication(settings, &mut auth)
            .await
            .expect("no fatal error");
        (outcome, auth)
    }

    #[tokio::test]
    async fn should_skip_when_disabled() {
        let settings = settings(&[("IS_AUTH", "false"), ("AUTH_TYPE", "header")]);

        let (outcome, auth) = apply(&settings).await;

        assert_eq!(outcome, AuthOutcome::Disabled);
        assert!(auth.is_empty());
    }

    #[tokio::test]
    async fn should_skip_when_flag_is_absent() {
        let (outcome, auth) = apply(&settings(&[("AUTH_TYPE", "header")])).await;

        assert_eq!(outcome, AuthOutcome::Disabled);
        assert!(auth.is_empty());
    }

    #[tokio::test]
    async fn should_report_invalid_flag() {
        let (outcome, auth) = apply(&settings(&[("IS_AUTH", "sometimes")])).await;

        assert!(matches!(
            outcome,
            AuthOutcome::Misconfigured(ConfigurationError::InvalidFlag { .. })
        ));
        assert!(auth.is_empty());
    }

    #[tokio::test]
    async fn should_skip_blank_strategy() {
        let (outcome, auth) = apply(&settings(&[("IS_AUTH", "true"), ("AUTH_TYPE", "  ")])).await;

        assert_eq!(outcome, AuthOutcome::Empty);
        assert!(auth.is_empty());
    }

    #[tokio::test]
    async fn should_apply_nothing_for_none() {
        let (outcome, auth) = apply(&settings(&[("IS_AUTH", "true"), ("AUTH_TYPE", "none")])).await;

        assert_eq!(outcome, AuthOutcome::ExplicitNone);
        assert!(auth.is_empty());
    }

    #[tokio::test]
    async fn should_ignore_unsupported_strategy() {
        let (outcome, auth) =
            apply(&settings(&[("IS_AUTH", "true"), ("AUTH_TYPE", "MAGIC")])).await;

        assert_eq!(
            outcome,
            AuthOutcome::Unsupported(UnsupportedStrategy {
                identifier: "MAGIC".to_string()
            })
        );
        assert!(!outcome.is_applied());
        assert!(auth.is_empty());
    }

    #[tokio::test]
    async fn should_default_to_basic() {
        let settings = settings(&[
            ("IS_AUTH", "true"),
            ("BASIC_AUTH_USER", "alice"),
            ("BASIC_AUTH_PASSWORD", "s3cret"),
        ]);

        let (outcome, auth) = apply(&settings).await;

        assert_eq!(outcome, AuthOutcome::Applied(AuthStrategy::Basic));
        assert_eq!(
            auth.scheme(),
            Some(&AuthScheme::Basic {
                username: "alice".to_string(),
                password: Secret::from("s3cret"),
                preemptive: false,
            })
        );
    }

    #[tokio::test]
    async fn should_apply_header() {
        let settings = settings(&[
            ("IS_AUTH", "true"),
            ("AUTH_TYPE", "header"),
            ("HEADER_AUTH_NAME", "X-Api-Key"),
            ("HEADER_AUTH_TYPE", "Token"),
            ("HEADER_AUTH_TOKEN", "abc-123"),
        ]);

        let (outcome, auth) = apply(&settings).await;

        assert_eq!(outcome, AuthOutcome::Applied(AuthStrategy::Header));
        let headers: Vec<_> = auth
            .headers()
            .map(|(name, value)| (name.to_string(), value.expose().to_string()))
            .collect();
        assert_eq!(
            headers,
            vec![("X-Api-Key".to_string(), "Token abc-123".to_string())]
        );
        assert_eq!(auth.scheme(), None);
    }

    #[tokio::test]
    async fn should_apply_preemptive_basic() {
        let settings = settings(&[
            ("IS_AUTH", "true"),
            ("AUTH_TYPE", "preemptive"),
            ("PREEMPTIVE_AUTH_USER", "bob"),
            ("PREEMPTIVE_AUTH_PASSWORD", "hunter2"),
        ]);

        let (outcome, auth) = apply(&settings).await;

        assert_eq!(outcome, AuthOutcome::Applied(AuthStrategy::Preemptive));
        assert!(matches!(
            auth.scheme(),
            Some(AuthScheme::Basic { username, preemptive: true, .. }) if username == "bob"
        ));
    }

    #[tokio::test]
    async fn should_apply_oauth1_in_header() {
        let settings = settings(&[
            ("IS_AUTH", "true"),
            ("AUTH_TYPE", "oauth1"),
            ("OAUTH1_KEY", "consumer"),
            ("OAUTH1_SECRET", "consumer-secret"),
            ("OAUTH1_ACCESS_TOKEN", "token"),
            ("OAUTH1_SECRET_TOKEN", "token-secret"),
        ]);

        let (outcome, auth) = apply(&settings).await;

        assert_eq!(outcome, AuthOutcome::Applied(AuthStrategy::OAuth1));
        let Some(AuthScheme::OAuth1(params)) = auth.scheme() else {
            panic!("expected OAuth1, got {:?}", auth.scheme());
        };
        assert_eq!(params.consumer_key, "consumer");
        assert_eq!(params.placement, SignaturePlacement::Header);
    }

    #[tokio::test]
    async fn should_be_idempotent_except_oauth2() {
        let base = [
            ("IS_AUTH", "true"),
            ("HEADER_AUTH_TOKEN", "abc"),
            ("BASIC_AUTH_USER", "alice"),
            ("PREEMPTIVE_AUTH_USER", "bob"),
            ("OAUTH1_KEY", "consumer"),
        ];

        for strategy in AuthStrategy::ALL
            .into_iter()
            .filter(|strategy| *strategy != AuthStrategy::OAuth2)
        {
            let mut properties = base.to_vec();
            properties.push(("AUTH_TYPE", strategy.as_str()));
            let settings = settings(&properties);

            let (_, once) = apply(&settings).await;
            let mut twice = RequestAuth::new();
            apply_authentication(&settings, &mut twice)
                .await
                .expect("first apply");
            apply_authentication(&settings, &mut twice)
                .await
                .expect("second apply");

            assert_eq!(once, twice, "{strategy}");
        }
    }

    #[tokio::test]
    async fn should_report_missing_token_url() {
        let (outcome, auth) =
            apply(&settings(&[("IS_AUTH", "true"), ("AUTH_TYPE", "oauth2")])).await;

        assert!(matches!(
            outcome,
            AuthOutcome::Misconfigured(ConfigurationError::Missing { .. })
        ));
        assert!(auth.is_empty());
    }

    #[tokio::test]
    async fn should_apply_oauth2_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-123",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;
        let token_url = format!("{}/oauth/token", server.uri());
        let settings = settings(&[
            ("IS_AUTH", "true"),
            ("AUTH_TYPE", "oauth2"),
            ("OAUTH2_CLIENT_ID", "client-id"),
            ("OAUTH2_CLIENT_SECRET", "client-secret"),
            ("OAUTH2_TOKEN_URL", token_url.as_str()),
        ]);

        let (outcome, auth) = apply(&settings).await;
        let (_, again) = apply(&settings).await;

        assert_eq!(outcome, AuthOutcome::Applied(AuthStrategy::OAuth2));
        assert_eq!(auth.scheme(), Some(&AuthScheme::Bearer("access-123".into())));
        assert_eq!(again, auth);
    }

    #[tokio::test]
    async fn should_fail_when_token_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let token_url = format!("{}/oauth/token", server.uri());
        let settings = settings(&[
            ("IS_AUTH", "true"),
            ("AUTH_TYPE", "oauth2"),
            ("OAUTH2_TOKEN_URL", token_url.as_str()),
        ]);
        let mut auth = RequestAuth::new();

        let result = apply_authentication(&settings, &mut auth).await;

        assert!(matches!(
            result,
            Err(AuthenticationError::TokenUnavailable(_))
        ));
        assert!(auth.is_empty());
    }
}
