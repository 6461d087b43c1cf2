//! Error types for the tripswitch library.
//!
//! All errors are local and synchronous: they are detected at the point of
//! the offending call and returned as `Result` values. The library never
//! panics and nothing is retried internally.

use thiserror::Error;

/// The main error type for breaker operations.
///
/// Errors fall into two groups: configuration errors, detected before a
/// usable breaker exists, and misuse errors, which signal a violated
/// lifecycle contract (for example reporting to a breaker that was never
/// started). Misuse is always surfaced as an `Err` value rather than a
/// hang on a dead channel.
#[derive(Debug, Error)]
pub enum BreakerError {
    /// The failure threshold is below the allowed minimum.
    #[error("failure threshold must be at least 1, got {value}")]
    InvalidThreshold {
        /// The rejected threshold value.
        value: u32,
    },

    /// The open timeout is below the allowed minimum.
    #[error("open timeout must be at least 1 interval, got {value}")]
    InvalidTimeout {
        /// The rejected timeout value.
        value: u32,
    },

    /// The tick interval is zero.
    #[error("tick interval must be non-zero")]
    InvalidInterval,

    /// `start` was called on a breaker that is already running.
    #[error("breaker is already running")]
    AlreadyRunning,

    /// An operation that requires a running event loop was called on a
    /// breaker that was never started or has already been stopped.
    #[error("breaker is not running")]
    NotRunning,
}

impl BreakerError {
    /// Returns `true` if this error was produced by configuration
    /// validation.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidThreshold { .. } | Self::InvalidTimeout { .. } | Self::InvalidInterval
        )
    }

    /// Returns `true` if this error signals a lifecycle-contract violation.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::NotRunning)
    }

    /// Creates an `InvalidThreshold` error.
    pub fn invalid_threshold(value: u32) -> Self {
        Self::InvalidThreshold { value }
    }

    /// Creates an `InvalidTimeout` error.
    pub fn invalid_timeout(value: u32) -> Self {
        Self::InvalidTimeout { value }
    }
}

/// A specialized `Result` type for breaker operations.
pub type BreakerResult<T> = Result<T, BreakerError>;
