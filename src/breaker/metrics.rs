//! Lifetime event counters for a circuit breaker.

use serde::{Deserialize, Serialize};

/// Counters describing what a breaker has observed since construction.
///
/// All counters are maintained by the event loop and exposed as cloned
/// snapshots; they are informational and play no part in state decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreakerMetrics {
    /// Number of success reports processed.
    pub success_reports: u64,
    /// Number of failure reports processed.
    pub failure_reports: u64,
    /// Number of reports ignored because the circuit was open.
    pub ignored_reports: u64,
    /// Number of clock ticks processed.
    pub ticks: u64,
    /// Number of times the circuit has opened.
    pub times_opened: u64,
    /// Number of times the circuit has closed from half-open.
    pub times_closed: u64,
}

impl BreakerMetrics {
    /// Creates new empty metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a processed success report.
    pub fn record_success(&mut self) {
        self.success_reports += 1;
    }

    /// Records a processed failure report.
    pub fn record_failure(&mut self) {
        self.failure_reports += 1;
    }

    /// Records a report ignored in the open state.
    pub fn record_ignored(&mut self) {
        self.ignored_reports += 1;
    }

    /// Records a processed clock tick.
    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    /// Records that the circuit opened.
    pub fn record_opened(&mut self) {
        self.times_opened += 1;
    }

    /// Records that the circuit closed from half-open.
    pub fn record_closed(&mut self) {
        self.times_closed += 1;
    }

    /// Total reports processed, including those ignored while open.
    pub fn total_reports(&self) -> u64 {
        self.success_reports + self.failure_reports + self.ignored_reports
    }

    /// Returns the failure rate among processed reports (0.0 to 1.0).
    pub fn failure_rate(&self) -> f64 {
        let counted = self.success_reports + self.failure_reports;
        if counted == 0 {
            return 0.0;
        }
        self.failure_reports as f64 / counted as f64
    }
}
