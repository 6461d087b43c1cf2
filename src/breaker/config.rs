//! Circuit breaker configuration.

use crate::core::{BreakerError, BreakerResult};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a circuit breaker.
///
/// All fields are immutable once the breaker is constructed; there is no
/// runtime reconfiguration. Validation happens at construction time so an
/// invalid configuration never produces a usable breaker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Number of failures within one interval that trips the circuit open.
    /// Must be at least 1.
    pub threshold: u32,

    /// Number of intervals the circuit stays open before probing.
    /// Must be at least 1.
    pub timeout: u32,

    /// Length of one clock interval. The closed-state failure counter is
    /// swept and the open-state elapsed counter advances once per interval.
    /// Must be non-zero.
    pub interval: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            timeout: 30,
            interval: Duration::from_secs(1),
        }
    }
}

impl BreakerConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the open timeout, in intervals.
    pub fn with_timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Creates a configuration that trips early and backs off for long.
    ///
    /// This configuration:
    /// - Uses a lower failure threshold (3)
    /// - Keeps the circuit open longer (60 intervals)
    pub fn sensitive() -> Self {
        Self {
            threshold: 3,
            timeout: 60,
            interval: Duration::from_secs(1),
        }
    }

    /// Creates a configuration that tolerates flaky dependencies.
    ///
    /// This configuration:
    /// - Uses a higher failure threshold (10)
    /// - Probes again quickly (10 intervals)
    pub fn tolerant() -> Self {
        Self {
            threshold: 10,
            timeout: 10,
            interval: Duration::from_secs(1),
        }
    }

    /// Validates the configuration.
    ///
    /// Returns the first violated constraint, if any.
    pub fn validate(&self) -> BreakerResult<()> {
        if self.threshold < 1 {
            return Err(BreakerError::invalid_threshold(self.threshold));
        }
        if self.timeout < 1 {
            return Err(BreakerError::invalid_timeout(self.timeout));
        }
        if self.interval.is_zero() {
            return Err(BreakerError::InvalidInterval);
        }
        Ok(())
    }
}
