//! Configuration error types.

/// Configuration failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A configuration source could not be read or merged.
    #[display("Failed to load configuration: {}", _0)]
    Load(String),

    /// The merged configuration did not match the schema.
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),

    /// A single setting had an unusable value.
    #[display("Invalid setting '{}': {}", key, reason)]
    InvalidSetting {
        /// The setting key
        key: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Configuration error with source location.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use bulwark_error::{ConfigError, ConfigErrorKind};
    ///
    /// let err = ConfigError::new(ConfigErrorKind::InvalidSetting {
    ///     key: "window_ms".to_string(),
    ///     reason: "not a number".to_string(),
    /// });
    /// assert!(err.to_string().contains("window_ms"));
    /// ```
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an invalid single setting.
    #[track_caller]
    pub fn invalid_setting(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        })
    }
}
