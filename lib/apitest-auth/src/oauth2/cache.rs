use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::credentials::{CredentialDelivery, OAuth2Credentials};
use super::error::TokenUnavailable;
use super::issuer::{HttpTokenIssuer, TokenIssuer};
use super::token::{Clock, TokenRecord};
use crate::auth::Secret;

/// Holder of the current OAuth2 token for one set of client credentials.
///
/// Each [`AuthSettings`](crate::AuthSettings) builds its own cache, every clone
/// of a cache shares the same token.
///
/// Concurrent callers are serialized: while one caller refreshes, the others
/// wait and then reuse the refreshed token, so a stale token triggers exactly
/// one round-trip to the token endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use apitest_auth::{
///     CredentialDelivery, HttpTokenIssuer, OAuth2Credentials, OAuth2TokenCache, SystemClock,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = OAuth2Credentials::new(
///     "my-client",
///     "my-secret",
///     "https://auth.example.com/oauth/token",
/// )?;
/// let cache = OAuth2TokenCache::new(
///     credentials,
///     CredentialDelivery::RequestBody,
///     HttpTokenIssuer::default(),
///     Arc::new(SystemClock),
/// );
///
/// let token = cache.get_token().await?;
/// println!("Authorization: Bearer {token}");
/// # Ok(())
/// # }
/// ```
pub struct OAuth2TokenCache<I = HttpTokenIssuer> {
    inner: Arc<Inner<I>>,
}

struct Inner<I> {
    credentials: OAuth2Credentials,
    delivery: CredentialDelivery,
    issuer: I,
    clock: Arc<dyn Clock>,
    record: Mutex<Option<TokenRecord>>,
}

impl<I> Clone for OAuth2TokenCache<I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: TokenIssuer> OAuth2TokenCache<I> {
    /// Creates an empty cache.
    pub fn new(
        credentials: OAuth2Credentials,
        delivery: CredentialDelivery,
        issuer: I,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let inner = Inner {
            credentials,
            delivery,
            issuer,
            clock,
            record: Mutex::new(None),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns a valid access token, fetching a new one when the cache is
    /// empty or the current token is past its refresh deadline.
    ///
    /// # Errors
    ///
    /// Fails when a fetch is needed and fails. The previous record, if any,
    /// is kept as is.
    pub async fn get_token(&self) -> Result<Secret, TokenUnavailable> {
        let mut record = self.inner.record.lock().await;

        let now = self.inner.clock.now();
        if let Some(current) = record.as_ref().filter(|current| current.is_valid_at(now)) {
            return Ok(current.access_token().clone());
        }

        debug!(
            client_id = self.inner.credentials.client_id(),
            "fetching a new OAuth2 token"
        );
        let fresh = self
            .inner
            .issuer
            .fetch(&self.inner.credentials, self.inner.delivery)
            .await
            .inspect_err(|err| warn!(%err, "cannot obtain an OAuth2 token"))?;
        let token = fresh.access_token().clone();
        *record = Some(fresh);

        Ok(token)
    }
}

impl<I> OAuth2TokenCache<I> {
    /// The cached record, valid or not.
    pub async fn current(&self) -> Option<TokenRecord> {
        self.inner.record.lock().await.clone()
    }

    /// Drops the cached record, the next [`Self::get_token`] fetches a new one.
    pub async fn invalidate(&self) {
        self.inner.record.lock().await.take();
    }

    /// The client credentials.
    pub fn credentials(&self) -> &OAuth2Credentials {
        &self.inner.credentials
    }

    /// How the credentials reach the token endpoint.
    pub fn delivery(&self) -> CredentialDelivery {
        self.inner.delivery
    }
}

impl<I> fmt::Debug for OAuth2TokenCache<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2TokenCache")
            .field("credentials", &self.inner.credentials)
            .field("delivery", &self.inner.delivery)
            .field("clock", &self.inner.clock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::oauth2::error::TokenFetchError;
    use crate::oauth2::token::testing::ManualClock;

    /// Hands out `token-1`, `token-2`... and counts the calls.
    #[derive(Debug)]
    struct CountingIssuer {
        clock: Arc<ManualClock>,
        calls: AtomicUsize,
        expires_in: u64,
        delay: Duration,
        failing: std::sync::atomic::AtomicBool,
    }

    impl CountingIssuer {
        fn new(clock: Arc<ManualClock>, expires_in: u64) -> Self {
            Self {
                clock,
                calls: AtomicUsize::new(0),
                expires_in,
                delay: Duration::ZERO,
                failing: std::sync::atomic::AtomicBool::new(false),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenIssuer for Arc<CountingIssuer> {
        async fn fetch(
            &self,
            _credentials: &OAuth2Credentials,
            _delivery: CredentialDelivery,
        ) -> Result<TokenRecord, TokenFetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(TokenFetchError::EmptyAccessToken);
            }
            Ok(TokenRecord::issued_at(
                format!("token-{call}"),
                self.expires_in,
                self.clock.now(),
            ))
        }
    }

    fn credentials() -> OAuth2Credentials {
        OAuth2Credentials::new("client-id", "client-secret", "http://localhost/token")
            .expect("valid credentials")
    }

    fn cache(issuer: &Arc<CountingIssuer>) -> OAuth2TokenCache<Arc<CountingIssuer>> {
        OAuth2TokenCache::new(
            credentials(),
            CredentialDelivery::RequestBody,
            Arc::clone(issuer),
            issuer.clock.clone(),
        )
    }

    #[tokio::test]
    async fn should_fetch_on_first_use() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(clock, 100));
        let cache = cache(&issuer);

        assert_eq!(cache.current().await, None);

        let token = cache.get_token().await.expect("token");

        assert_eq!(token.expose(), "token-1");
        assert_eq!(issuer.calls(), 1);
        assert!(cache.current().await.is_some());
    }

    #[tokio::test]
    async fn should_reuse_token_before_refresh_deadline() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(Arc::clone(&clock), 100));
        let cache = cache(&issuer);
        cache.get_token().await.expect("token");

        clock.set(1_079);
        let token = cache.get_token().await.expect("token");

        assert_eq!(token.expose(), "token-1");
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn should_refresh_at_deadline() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(Arc::clone(&clock), 100));
        let cache = cache(&issuer);
        cache.get_token().await.expect("token");

        clock.set(1_080);
        let token = cache.get_token().await.expect("token");

        assert_eq!(token.expose(), "token-2");
        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test]
    async fn should_refresh_after_deadline() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(Arc::clone(&clock), 100));
        let cache = cache(&issuer);
        cache.get_token().await.expect("token");

        clock.set(1_081);
        let token = cache.get_token().await.expect("token");

        assert_eq!(token.expose(), "token-2");
        let current = cache.current().await.expect("record");
        assert_eq!(current.refresh_deadline(), 1_161);
    }

    #[tokio::test]
    async fn should_refetch_short_lived_tokens_every_time() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(clock, 10));
        let cache = cache(&issuer);

        cache.get_token().await.expect("token");
        cache.get_token().await.expect("token");

        assert_eq!(issuer.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_fetch_once_for_concurrent_callers() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer {
            delay: Duration::from_millis(50),
            ..CountingIssuer::new(clock, 3_600)
        });
        let cache = cache(&issuer);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_token().await })
            })
            .collect();

        for handle in handles {
            let token = handle.await.expect("task").expect("token");
            assert_eq!(token.expose(), "token-1");
        }
        assert_eq!(issuer.calls(), 1);
    }

    #[tokio::test]
    async fn should_keep_previous_record_on_failure() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(Arc::clone(&clock), 100));
        let cache = cache(&issuer);
        cache.get_token().await.expect("token");
        let previous = cache.current().await;

        clock.set(2_000);
        issuer.failing.store(true, Ordering::SeqCst);
        let result = cache.get_token().await;

        assert!(result.is_err());
        assert_eq!(cache.current().await, previous);
    }

    #[tokio::test]
    async fn should_retry_after_failure() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(clock, 100));
        let cache = cache(&issuer);
        issuer.failing.store(true, Ordering::SeqCst);
        assert!(cache.get_token().await.is_err());

        issuer.failing.store(false, Ordering::SeqCst);
        let token = cache.get_token().await.expect("token");

        assert_eq!(token.expose(), "token-2");
    }

    #[tokio::test]
    async fn should_fetch_again_after_invalidate() {
        let clock = Arc::new(ManualClock::at(1_000));
        let issuer = Arc::new(CountingIssuer::new(clock, 3_600));
        let cache = cache(&issuer);
        cache.get_token().await.expect("token");

        cache.invalidate().await;
        let token = cache.get_token().await.expect("token");

        assert_eq!(token.expose(), "token-2");
        assert_eq!(issuer.calls(), 2);
    }
}
