//! Settings resolution: stores, the resolver and typed [`AuthSettings`].

mod error;
pub mod keys;
mod settings;
mod source;

pub use self::error::ConfigurationError;
pub use self::settings::{AuthSettings, BasicCredentials, HeaderCredentials};
pub use self::source::{ConfigResolver, ConfigSource, EnvSource, PropertyStore};
