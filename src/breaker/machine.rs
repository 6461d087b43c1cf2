//! The circuit breaker state machine.
//!
//! Pure transition logic, exercised by the event loop one event at a time.
//! Because the loop is the sole caller, nothing in here needs a lock; the
//! published snapshot in [`Shared`] is the only point of contact with
//! concurrent readers.

use crate::breaker::{BreakerConfig, Shared};
use crate::core::{Outcome, State};

use std::sync::Arc;

/// Mutable breaker state, owned exclusively by the event loop.
#[derive(Debug)]
pub(crate) struct Machine {
    threshold: u32,
    timeout: u32,
    state: State,
    /// Failures observed in the current interval while closed.
    failure_count: u32,
    /// Intervals elapsed since the circuit opened.
    open_elapsed: u32,
    shared: Arc<Shared>,
}

impl Machine {
    pub(crate) fn new(config: &BreakerConfig, shared: Arc<Shared>) -> Self {
        Self {
            threshold: config.threshold,
            timeout: config.timeout,
            state: State::Closed,
            failure_count: 0,
            open_elapsed: 0,
            shared,
        }
    }

    /// Applies one outcome report.
    pub(crate) fn on_report(&mut self, outcome: Outcome) {
        match self.state {
            // Reports carry no information while the circuit is open.
            State::Open => {
                self.shared.with_metrics(|m| m.record_ignored());
            }

            State::HalfOpen => {
                self.record_outcome(outcome);
                if outcome.is_success() {
                    // The probe succeeded: fully restore traffic. The next
                    // closed-state interval starts with a fresh counter.
                    self.failure_count = 0;
                    self.shared.with_metrics(|m| m.record_closed());
                    self.set_state(State::Closed);
                } else {
                    // A failed probe leaves the circuit half-open; the next
                    // successful probe still closes it. Reopening here would
                    // change recovery pacing, so it stays an explicit
                    // non-transition.
                    tracing::debug!("probe failed, circuit stays half-open");
                }
            }

            State::Closed => {
                self.record_outcome(outcome);
                if outcome.is_failure() {
                    self.failure_count += 1;
                }
            }
        }
    }

    /// Applies one elapsed interval.
    pub(crate) fn on_tick(&mut self) {
        self.shared.with_metrics(|m| m.record_tick());

        match self.state {
            // The probe is paced by the caller, not the clock.
            State::HalfOpen => {}

            State::Open => {
                self.open_elapsed += 1;
                if self.open_elapsed == self.timeout {
                    self.set_state(State::HalfOpen);
                }
            }

            State::Closed => {
                if self.failure_count >= self.threshold {
                    tracing::warn!(
                        failures = self.failure_count,
                        threshold = self.threshold,
                        "failure threshold reached, circuit opened"
                    );
                    self.open_elapsed = 0;
                    self.shared.with_metrics(|m| m.record_opened());
                    self.set_state(State::Open);
                }
                // Sweep the counter at every interval boundary, including
                // the one that just tripped the circuit.
                self.failure_count = 0;
            }
        }
    }

    /// Restores the initial state, as seen after a stop.
    pub(crate) fn reset(&mut self) {
        self.failure_count = 0;
        self.open_elapsed = 0;
        self.set_state(State::Closed);
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> State {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn failure_count(&self) -> u32 {
        self.failure_count
    }

    #[cfg(test)]
    pub(crate) fn open_elapsed(&self) -> u32 {
        self.open_elapsed
    }

    fn record_outcome(&self, outcome: Outcome) {
        self.shared.with_metrics(|m| {
            if outcome.is_failure() {
                m.record_failure();
            } else {
                m.record_success();
            }
        });
    }

    fn set_state(&mut self, next: State) {
        if self.state != next {
            tracing::info!(from = %self.state, to = %next, "circuit state changed");
        }
        self.state = next;
        self.shared.publish(next);
    }
}
