//! Hand-driven tick source for deterministic tests.

use crate::clock::{Clock, Tick};
use crate::core::{BreakerError, BreakerResult};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// A tick source driven entirely by a [`ManualClockHandle`].
///
/// No wall-clock time is involved: each call to
/// [`advance`](ManualClockHandle::advance) delivers exactly one tick and
/// resolves only after the event loop has processed it. Scenarios that
/// would otherwise need real sleeps become plain sequential code.
///
/// ## Example
///
/// ```rust,ignore
/// let (clock, handle) = ManualClock::new();
/// breaker.start_with_clock(clock)?;
///
/// breaker.report_failure().await?;
/// handle.advance().await?; // end of interval: the counter is inspected
/// ```
#[derive(Debug)]
pub struct ManualClock {
    triggers: mpsc::UnboundedReceiver<oneshot::Sender<()>>,
}

impl ManualClock {
    /// Creates a manual clock and the handle that drives it.
    pub fn new() -> (Self, ManualClockHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { triggers: rx }, ManualClockHandle { triggers: tx })
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn next_tick(&mut self) -> Tick {
        match self.triggers.recv().await {
            Some(done) => Tick::acked(done),
            // Every handle is gone: no further ticks can ever arrive.
            // Park forever; the event loop's other branches stay live.
            None => std::future::pending().await,
        }
    }
}

/// Drives a [`ManualClock`].
///
/// Handles are cheap to clone and remain valid for one breaker run; once
/// the breaker is stopped, `advance` reports [`BreakerError::NotRunning`].
#[derive(Debug, Clone)]
pub struct ManualClockHandle {
    triggers: mpsc::UnboundedSender<oneshot::Sender<()>>,
}

impl ManualClockHandle {
    /// Delivers one tick and waits until the breaker has processed it.
    pub async fn advance(&self) -> BreakerResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.triggers
            .send(done_tx)
            .map_err(|_| BreakerError::NotRunning)?;
        done_rx.await.map_err(|_| BreakerError::NotRunning)
    }

    /// Delivers `count` ticks one at a time, in order.
    pub async fn advance_many(&self, count: u32) -> BreakerResult<()> {
        for _ in 0..count {
            self.advance().await?;
        }
        Ok(())
    }
}
