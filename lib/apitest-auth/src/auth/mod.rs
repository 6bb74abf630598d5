//! Authentication strategies and how they are attached to outgoing requests.

mod dispatch;
mod error;
mod oauth1;
mod secret;
mod strategy;
mod target;

pub use self::dispatch::{AuthOutcome, apply_authentication};
pub use self::error::AuthenticationError;
pub use self::secret::Secret;
pub use self::strategy::{AuthStrategy, StrategySelection, UnsupportedStrategy};
pub use self::target::{AuthScheme, AuthTarget, OAuth1Params, RequestAuth, SignaturePlacement};
