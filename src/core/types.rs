//! Circuit state and outcome classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The observable state of a circuit breaker.
///
/// The breaker is always in exactly one of these states. Transitions are
/// driven solely by the event loop; see the crate-level documentation for
/// the full transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Normal operation: calls are permitted and failures are counted per
    /// clock interval.
    #[default]
    Closed,

    /// Tripped: callers should avoid the dependency. All outcome reports
    /// are ignored while the configured timeout elapses.
    Open,

    /// Probing: the next reported outcome decides whether the circuit
    /// closes again. Clock ticks are ignored; the probe is paced by the
    /// caller, not the clock.
    HalfOpen,
}

impl State {
    /// Returns `true` if the circuit is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns `true` if the circuit is open.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns `true` if the circuit is half-open.
    pub fn is_half_open(&self) -> bool {
        matches!(self, Self::HalfOpen)
    }

    /// Returns the name of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The classification of a single call attempt, as reported by the caller.
///
/// Reports carry no payload beyond the classification; the breaker does not
/// care why a call failed, only that it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The call attempt succeeded.
    Success,

    /// The call attempt failed.
    Failure,
}

impl Outcome {
    /// Classifies from a failure flag.
    pub fn from_failed(failed: bool) -> Self {
        if failed {
            Self::Failure
        } else {
            Self::Success
        }
    }

    /// Returns `true` if this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure)
    }

    /// Returns `true` if this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Failure => f.write_str("failure"),
        }
    }
}
