use std::env::VarError;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

/// A store of named string settings.
pub trait ConfigSource: Send + Sync {
    /// Returns the raw value for `key`, if the store defines it.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env_value(key, std::env::var(key))
    }
}

fn env_value(key: &str, value: Result<String, VarError>) -> Option<String> {
    match value {
        Ok(value) => Some(value),
        Err(VarError::NotPresent) => None,
        Err(VarError::NotUnicode(_)) => {
            warn!(key, "environment variable is not valid UTF-8, ignored");
            None
        }
    }
}

/// In-memory property store, typically loaded from a properties file by the caller.
///
/// # Example
///
/// ```rust
/// use apitest_auth::{ConfigSource, PropertyStore};
///
/// let store: PropertyStore = [("IS_AUTH", "true"), ("AUTH_TYPE", "header")]
///     .into_iter()
///     .collect();
///
/// assert_eq!(store.get("AUTH_TYPE").as_deref(), Some("header"));
/// assert_eq!(store.get("BASIC_AUTH_USER"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    values: IndexMap<String, String>,
}

impl PropertyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a property.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds or replaces a property in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the store has no property.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values = iter
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self { values }
    }
}

impl ConfigSource for PropertyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Resolves settings from an override store, then a property store.
///
/// An override only wins when it is non-empty, an empty environment variable
/// does not hide the property. Either store may be missing, a missing store
/// behaves like an empty one. No caching happens here: every call reads the
/// stores as they are at call time.
///
/// # Example
///
/// ```rust
/// use apitest_auth::{ConfigResolver, PropertyStore};
///
/// let overrides = PropertyStore::new().with("AUTH_TYPE", "oauth2");
/// let properties = PropertyStore::new()
///     .with("AUTH_TYPE", "basic")
///     .with("IS_AUTH", "true");
///
/// let resolver = ConfigResolver::new()
///     .with_overrides(overrides)
///     .with_properties(properties);
///
/// assert_eq!(resolver.resolve("AUTH_TYPE").as_deref(), Some("oauth2"));
/// assert_eq!(resolver.resolve("IS_AUTH").as_deref(), Some("true"));
/// assert_eq!(resolver.resolve("OAUTH2_SCOPE"), None);
/// ```
#[derive(Clone, Default)]
pub struct ConfigResolver {
    overrides: Option<Arc<dyn ConfigSource>>,
    properties: Option<Arc<dyn ConfigSource>>,
}

impl ConfigResolver {
    /// Creates a resolver without any store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver using the process environment as override store.
    pub fn from_env() -> Self {
        Self::new().with_overrides(EnvSource)
    }

    /// Sets the override store.
    #[must_use]
    pub fn with_overrides(mut self, source: impl ConfigSource + 'static) -> Self {
        self.overrides = Some(Arc::new(source));
        self
    }

    /// Sets the property store.
    #[must_use]
    pub fn with_properties(mut self, source: impl ConfigSource + 'static) -> Self {
        self.properties = Some(Arc::new(source));
        self
    }

    /// Resolves `key`, override store first.
    pub fn resolve(&self, key: &str) -> Option<String> {
        let overridden = self
            .overrides
            .as_ref()
            .and_then(|source| source.get(key))
            .filter(|value| !value.is_empty());
        if overridden.is_some() {
            return overridden;
        }

        self.properties.as_ref().and_then(|source| source.get(key))
    }

    /// Resolves `key`, falling back to `default`.
    pub fn resolve_or(&self, key: &str, default: &str) -> String {
        self.resolve(key).unwrap_or_else(|| default.to_string())
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("overrides", &self.overrides.is_some())
            .field("properties", &self.properties.is_some())
            .finish()
    }
}
