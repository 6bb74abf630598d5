use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Sensitive string (password, token, client secret) that is wiped from memory on drop.
///
/// `Debug` never shows the value and `Display` only shows a masked form,
/// so a `Secret` can be passed to `tracing` fields without leaking it.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Wraps a sensitive value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the clear value.
    ///
    /// Keep the returned reference short-lived.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn masked(&self) -> String {
        let count = self.0.chars().count();
        if count <= 8 {
            return "***".to_string();
        }
        let head: String = self.0.chars().take(4).collect();
        let tail: String = self.0.chars().skip(count - 4).collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_redact_debug() {
        let secret = Secret::new("super-secret-password");

        let debug = format!("{secret:?}");

        insta::assert_snapshot!(debug, @r#"Secret("[REDACTED]")"#);
    }

    #[test]
    fn should_mask_display() {
        assert_eq!(Secret::from("short").to_string(), "***");
        assert_eq!(Secret::from("12345678").to_string(), "***");
        assert_eq!(Secret::from("123456789").to_string(), "1234...6789");
        assert_eq!(
            Secret::from("very-secret-token-12345").to_string(),
            "very...2345"
        );
    }

    #[test]
    fn should_mask_multibyte_values_on_char_boundaries() {
        let secret = Secret::from("ééééééééé");

        assert_eq!(secret.to_string(), "éééé...éééé");
    }

    #[test]
    fn should_expose_value() {
        let secret = Secret::from(String::from("token"));

        assert_eq!(secret.expose(), "token");
        assert!(!secret.is_empty());
        assert!(Secret::default().is_empty());
    }
}
