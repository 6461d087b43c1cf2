//! Tick sources for the breaker's event loop.
//!
//! The breaker does not read wall-clock time directly. It consumes ticks
//! from a [`Clock`], which lets tests drive every interval by hand instead
//! of sleeping.
//!
//! Two implementations are provided:
//!
//! - [`WallClock`]: one tick per fixed wall-clock period (production)
//! - [`ManualClock`]: ticks delivered on demand through a
//!   [`ManualClockHandle`] (deterministic tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tripswitch::{Breaker, BreakerConfig, ManualClock};
//!
//! let (clock, handle) = ManualClock::new();
//! let mut breaker = Breaker::new(BreakerConfig::default())?;
//! breaker.start_with_clock(clock)?;
//!
//! // One interval elapses; resolves once the breaker has processed it.
//! handle.advance().await?;
//! ```

mod manual;
mod wall;

pub use manual::{ManualClock, ManualClockHandle};
pub use wall::WallClock;

use async_trait::async_trait;
use tokio::sync::oneshot;

/// A single elapsed interval, delivered to the event loop.
///
/// A tick may carry a completion channel; the loop fires it after the tick
/// has been fully processed. [`ManualClockHandle::advance`] uses this to
/// make test sequencing deterministic.
#[derive(Debug, Default)]
pub struct Tick {
    done: Option<oneshot::Sender<()>>,
}

impl Tick {
    /// Creates a plain tick with no completion channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tick whose processing is acknowledged through `done`.
    pub fn acked(done: oneshot::Sender<()>) -> Self {
        Self { done: Some(done) }
    }

    /// Signals that the event loop has finished processing this tick.
    pub(crate) fn complete(self) {
        if let Some(done) = self.done {
            // The other side may have given up waiting; that is fine.
            let _ = done.send(());
        }
    }
}

/// A source of clock ticks for the event loop.
///
/// One tick marks the end of one interval: the closed-state failure counter
/// is swept and the open-state elapsed counter advances. The event loop
/// owns its clock for the lifetime of a run and drops it on stop, so a
/// clock never outlives the loop it feeds.
///
/// Implementations must be cancel-safe: `next_tick` is polled inside a
/// `select!` and may be dropped before completion without losing a tick.
#[async_trait]
pub trait Clock: Send + 'static {
    /// Completes when the next interval elapses.
    async fn next_tick(&mut self) -> Tick;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_tick_completes_without_listener() {
        // Must not panic or hang.
        Tick::new().complete();
    }

    #[tokio::test]
    async fn test_acked_tick_notifies() {
        let (tx, rx) = oneshot::channel();
        Tick::acked(tx).complete();
        assert!(rx.await.is_ok());
    }

    #[tokio::test]
    async fn test_acked_tick_tolerates_dropped_listener() {
        let (tx, rx) = oneshot::channel();
        drop(rx);
        Tick::acked(tx).complete();
    }
}
