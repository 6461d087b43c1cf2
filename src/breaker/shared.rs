//! State and metrics published by the event loop to concurrent readers.

use crate::breaker::BreakerMetrics;
use crate::core::State;

use std::sync::RwLock;
use tokio::sync::watch;

/// The breaker's externally visible snapshot.
///
/// The event loop is the only writer; readers see the state as of the most
/// recently processed event, which may trail the instant of the read by the
/// events still in flight. That lag is inherent to the design and fine for
/// a health-check-style read; a torn or invalid value is never observable.
#[derive(Debug)]
pub(crate) struct Shared {
    state: watch::Sender<State>,
    metrics: RwLock<BreakerMetrics>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(State::Closed);
        Self {
            state,
            metrics: RwLock::new(BreakerMetrics::new()),
        }
    }

    /// Returns the most recently published state.
    pub(crate) fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Publishes a new state, waking subscribers only on a real change.
    pub(crate) fn publish(&self, next: State) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// Returns a receiver that observes state changes.
    pub(crate) fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    /// Mutates the metrics under the lock.
    pub(crate) fn with_metrics<F>(&self, f: F)
    where
        F: FnOnce(&mut BreakerMetrics),
    {
        let mut metrics = self
            .metrics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut metrics);
    }

    /// Returns a copy of the current metrics.
    pub(crate) fn metrics(&self) -> BreakerMetrics {
        self.metrics
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Clears metrics back to zero.
    pub(crate) fn reset_metrics(&self) {
        *self
            .metrics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = BreakerMetrics::new();
    }
}
