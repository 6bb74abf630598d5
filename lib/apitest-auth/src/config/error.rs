/// A setting could not be turned into a usable value.
///
/// Configuration problems are not fatal: the dispatcher logs them and
/// applies no authentication.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ConfigurationError {
    /// Numeric setting that does not parse.
    #[display("Setting '{key}' is not a valid number: '{value}' ({message})")]
    InvalidNumber {
        /// The setting name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// Parser message.
        message: String,
    },

    /// Boolean setting that does not parse.
    #[display("Setting '{key}' is not a valid flag: '{value}'")]
    InvalidFlag {
        /// The setting name.
        key: &'static str,
        /// The raw value.
        value: String,
    },

    /// Setting with no value and no default.
    #[display("Setting '{key}' is required")]
    Missing {
        /// The setting name.
        key: &'static str,
    },

    /// URL setting that does not parse.
    #[display("Setting '{key}' is not a valid URL: '{value}' ({message})")]
    InvalidUrl {
        /// The setting name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// Parser message.
        message: String,
    },

    /// Setting outside its closed set of values.
    #[display("Setting '{key}' has unsupported value '{value}', expected one of: {expected}")]
    UnsupportedValue {
        /// The setting name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// The accepted values.
        expected: &'static str,
    },

    /// The HTTP client used for the token endpoint cannot be built.
    #[display("Cannot build the token endpoint HTTP client: {message}")]
    HttpClient {
        /// Builder message.
        message: String,
    },
}
