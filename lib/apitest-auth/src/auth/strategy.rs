use std::fmt;
use std::str::FromStr;

/// The mutually exclusive ways of authenticating a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStrategy {
    /// Explicitly no authentication.
    None,
    /// Custom header `{name}: {type} {token}`.
    Header,
    /// HTTP Basic, sent when the server challenges.
    Basic,
    /// HTTP Basic, sent with the first request.
    Preemptive,
    /// OAuth 1.0a signed request.
    OAuth1,
    /// OAuth2 client-credentials bearer token.
    OAuth2,
}

impl AuthStrategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Header,
        Self::Basic,
        Self::Preemptive,
        Self::OAuth1,
        Self::OAuth2,
    ];

    /// The configuration identifier of this strategy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Header => "header",
            Self::Basic => "basic",
            Self::Preemptive => "preemptive",
            Self::OAuth1 => "oauth1",
            Self::OAuth2 => "oauth2",
        }
    }
}

impl fmt::Display for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthStrategy {
    type Err = UnsupportedStrategy;

    fn from_str(identifier: &str) -> Result<Self, Self::Err> {
        let normalized = identifier.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UnsupportedStrategy {
                identifier: identifier.to_string(),
            })
    }
}

/// A strategy identifier that names no known strategy.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("Unsupported authentication strategy '{identifier}'")]
pub struct UnsupportedStrategy {
    /// The identifier as configured.
    pub identifier: String,
}

/// Outcome of reading the configured strategy identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategySelection {
    /// The identifier is blank.
    Empty,
    /// A known strategy.
    Strategy(AuthStrategy),
    /// An identifier that names no strategy.
    Unsupported(UnsupportedStrategy),
}

impl StrategySelection {
    /// Parses a raw identifier.
    pub fn parse(identifier: &str) -> Self {
        if identifier.trim().is_empty() {
            return Self::Empty;
        }
        match identifier.parse() {
            Ok(strategy) => Self::Strategy(strategy),
            Err(unsupported) => Self::Unsupported(unsupported),
        }
    }
}
