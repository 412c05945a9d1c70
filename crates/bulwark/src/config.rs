//! Layered configuration loading.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from bulwark.toml)
//! - `~/.config/bulwark/bulwark.toml`
//! - `./bulwark.toml`

use bulwark_error::{BulwarkError, BulwarkResult, ConfigError, ConfigErrorKind, PolicyError};
use bulwark_rate_limit::DefaultLimits;
use bulwark_retry::{RetryConfig, RetryPolicy};
use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../bulwark.toml");

/// Complete Bulwark configuration.
///
/// # Example
///
/// ```toml
/// [retry]
/// max_attempts = 5
/// initial_delay_ms = 250
///
/// [rate_limits.providers.anthropic]
/// requests_per_minute = 1000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BulwarkConfig {
    /// Retry settings shared by every provider binding
    #[serde(default)]
    pub retry: RetryConfig,

    /// Requests-per-minute overrides merged over the built-in table
    #[serde(default)]
    pub rate_limits: DefaultLimits,
}

impl BulwarkConfig {
    /// Load configuration from a specific file path.
    ///
    /// Values missing from the file take their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> BulwarkResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
            .build()
            .map_err(|e| {
                BulwarkError::from(ConfigError::new(ConfigErrorKind::Load(format!(
                    "{}: {}",
                    path.as_ref().display(),
                    e
                ))))
            })?
            .try_deserialize()
            .map_err(|e| BulwarkError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string()))))
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if absent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bulwark::BulwarkConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = BulwarkConfig::load()?;
    /// println!("{} attempts", config.retry.max_attempts());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> BulwarkResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/bulwark/bulwark.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("bulwark").required(false));

        builder
            .build()
            .map_err(|e| BulwarkError::from(ConfigError::new(ConfigErrorKind::Load(e.to_string()))))?
            .try_deserialize()
            .map_err(|e| BulwarkError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string()))))
    }

    /// The bundled defaults alone, ignoring user files.
    ///
    /// # Errors
    ///
    /// Returns an error only if the bundled file is malformed.
    pub fn bundled() -> BulwarkResult<Self> {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .map_err(|e| BulwarkError::from(ConfigError::new(ConfigErrorKind::Load(e.to_string()))))?
            .try_deserialize()
            .map_err(|e| BulwarkError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string()))))
    }

    /// Built-in limits with this configuration's overrides applied.
    pub fn limits(&self) -> DefaultLimits {
        DefaultLimits::builtin().merge(&self.rate_limits)
    }

    /// The configured retry policy.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if the `[retry]` values are out of range.
    pub fn retry_policy(&self) -> Result<RetryPolicy, PolicyError> {
        self.retry.to_policy()
    }
}
