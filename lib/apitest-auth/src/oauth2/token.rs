//! OAuth2 token records and the clock used to age them.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::Secret;

/// Seconds subtracted from the token lifetime to decide staleness early.
pub const REFRESH_MARGIN_SECS: u64 = 20;

/// Source of the current time, in seconds since the Unix epoch.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in epoch seconds.
    fn now(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// A bearer token as returned by the token endpoint.
///
/// Records are never updated: a refresh replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    access_token: Secret,
    expires_in: u64,
    refresh_deadline: u64,
}

impl TokenRecord {
    /// Creates a record for a token issued at `issued_at` (epoch seconds).
    ///
    /// The refresh deadline is `issued_at + expires_in - 20`, saturating at zero.
    pub fn issued_at(access_token: impl Into<Secret>, expires_in: u64, issued_at: u64) -> Self {
        let refresh_deadline = issued_at
            .saturating_add(expires_in)
            .saturating_sub(REFRESH_MARGIN_SECS);
        Self {
            access_token: access_token.into(),
            expires_in,
            refresh_deadline,
        }
    }

    /// The access token.
    pub fn access_token(&self) -> &Secret {
        &self.access_token
    }

    /// Lifetime announced by the issuer, in seconds.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    /// Epoch second from which the token is considered stale.
    pub fn refresh_deadline(&self) -> u64 {
        self.refresh_deadline
    }

    /// Returns `true` while `now` is strictly before the refresh deadline.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.refresh_deadline > now
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::Clock;

    /// Clock moved by hand.
    #[derive(Debug, Default)]
    pub(crate) struct ManualClock(AtomicU64);

    impl ManualClock {
        pub(crate) fn at(now: u64) -> Self {
            Self(AtomicU64::new(now))
        }

        pub(crate) fn set(&self, now: u64) {
            self.0.store(now, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }
}
