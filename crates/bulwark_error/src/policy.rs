//! Retry policy validation errors.

use std::time::Duration;

/// Invalid retry policy parameter combinations.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum PolicyErrorKind {
    /// At least one attempt is required.
    #[display("max_attempts must be at least 1, got {}", _0)]
    MaxAttempts(u32),

    /// Multiplier must be a finite number above zero.
    #[display("multiplier must be finite and greater than 0, got {}", _0)]
    Multiplier(f64),

    /// The delay cap is below the starting delay.
    #[display(
        "max_delay ({:?}) must not be shorter than initial_delay ({:?})",
        max_delay,
        initial_delay
    )]
    DelayOrder {
        /// Configured initial delay
        initial_delay: Duration,
        /// Configured maximum delay
        max_delay: Duration,
    },
}

/// Retry policy error with location tracking.
///
/// # Examples
///
/// ```
/// use bulwark_error::{PolicyError, PolicyErrorKind};
///
/// let err = PolicyError::new(PolicyErrorKind::MaxAttempts(0));
/// assert!(err.to_string().contains("at least 1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Retry Policy Error: {} at line {} in {}", kind, line, file)]
pub struct PolicyError {
    kind: PolicyErrorKind,
    line: u32,
    file: &'static str,
}

impl PolicyError {
    /// Create a new policy error with caller location tracking.
    #[track_caller]
    pub fn new(kind: PolicyErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PolicyErrorKind {
        &self.kind
    }
}
