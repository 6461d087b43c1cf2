//! The single-consumer event loop behind a running breaker.
//!
//! One background task owns the [`Machine`] and reacts to whichever of
//! three sources fires first: an outcome report, a clock tick, or the stop
//! signal. Serializing every mutation through this loop is what makes the
//! transitions linearizable without locks.

use crate::breaker::Machine;
use crate::clock::Clock;
use crate::core::Outcome;

use tokio::sync::{mpsc, oneshot};

/// A report in flight from a producer to the loop.
///
/// `done` is fired once the report has been processed, which is what makes
/// `Breaker::report` a synchronous handoff.
#[derive(Debug)]
pub(crate) struct ReportMsg {
    pub(crate) outcome: Outcome,
    pub(crate) done: oneshot::Sender<()>,
}

/// The event loop for one run of a breaker.
///
/// Constructed by `Breaker::start` and consumed by [`run`](Self::run) on a
/// spawned task. The loop owns its clock, so stopping the loop releases the
/// timer as well, on every exit path.
pub(crate) struct EventLoop {
    reports: mpsc::Receiver<ReportMsg>,
    clock: Box<dyn Clock>,
    shutdown: oneshot::Receiver<()>,
    machine: Machine,
}

impl EventLoop {
    pub(crate) fn new(
        reports: mpsc::Receiver<ReportMsg>,
        clock: Box<dyn Clock>,
        shutdown: oneshot::Receiver<()>,
        machine: Machine,
    ) -> Self {
        Self {
            reports,
            clock,
            shutdown,
            machine,
        }
    }

    /// Processes events until stopped, then resets the machine.
    ///
    /// Events are taken strictly in arrival order per source; when a report
    /// and a tick are both ready, whichever branch the select picks first
    /// wins. There is no batching and no priority between the two.
    pub(crate) async fn run(mut self) {
        tracing::debug!("breaker event loop started");

        loop {
            tokio::select! {
                msg = self.reports.recv() => match msg {
                    Some(ReportMsg { outcome, done }) => {
                        self.machine.on_report(outcome);
                        // The producer may have gone away; nothing to do.
                        let _ = done.send(());
                    }
                    // Every sender is gone: the breaker was dropped without
                    // a stop. Wind down exactly as a stop would.
                    None => break,
                },

                tick = self.clock.next_tick() => {
                    self.machine.on_tick();
                    tick.complete();
                }

                _ = &mut self.shutdown => break,
            }
        }

        // A stopped breaker reads as freshly constructed.
        self.machine.reset();
        tracing::debug!("breaker event loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::{BreakerConfig, Shared};
    use crate::clock::ManualClock;
    use crate::core::State;
    use std::sync::Arc;

    struct Fixture {
        reports: mpsc::Sender<ReportMsg>,
        shutdown: Option<oneshot::Sender<()>>,
        shared: Arc<Shared>,
        handle: tokio::task::JoinHandle<()>,
    }

    fn spawn_loop(threshold: u32, timeout: u32) -> (Fixture, crate::clock::ManualClockHandle) {
        let config = BreakerConfig::new()
            .with_threshold(threshold)
            .with_timeout(timeout);
        let shared = Arc::new(Shared::new());
        let machine = Machine::new(&config, Arc::clone(&shared));

        let (report_tx, report_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (clock, clock_handle) = ManualClock::new();

        let event_loop = EventLoop::new(report_rx, Box::new(clock), shutdown_rx, machine);
        let handle = tokio::spawn(event_loop.run());

        (
            Fixture {
                reports: report_tx,
                shutdown: Some(shutdown_tx),
                shared,
                handle,
            },
            clock_handle,
        )
    }

    async fn send_report(fixture: &Fixture, outcome: Outcome) {
        let (done_tx, done_rx) = oneshot::channel();
        fixture
            .reports
            .send(ReportMsg {
                outcome,
                done: done_tx,
            })
            .await
            .unwrap();
        done_rx.await.unwrap();
    }

    #[tokio::test]
    async fn test_loop_processes_reports_and_ticks_in_order() {
        let (fixture, clock) = spawn_loop(2, 3);

        send_report(&fixture, Outcome::Failure).await;
        send_report(&fixture, Outcome::Failure).await;
        assert_eq!(fixture.shared.state(), State::Closed);

        clock.advance().await.unwrap();
        assert_eq!(fixture.shared.state(), State::Open);

        fixture.handle.abort();
    }

    #[tokio::test]
    async fn test_shutdown_signal_resets_and_exits() {
        let (mut fixture, clock) = spawn_loop(1, 3);

        send_report(&fixture, Outcome::Failure).await;
        clock.advance().await.unwrap();
        assert_eq!(fixture.shared.state(), State::Open);

        fixture.shutdown.take().unwrap().send(()).unwrap();
        fixture.handle.await.unwrap();

        assert_eq!(fixture.shared.state(), State::Closed);
        // The clock died with the loop.
        assert!(clock.advance().await.is_err());
    }

    #[tokio::test]
    async fn test_dropping_all_senders_stops_the_loop() {
        let (fixture, _clock) = spawn_loop(1, 3);

        drop(fixture.reports);
        drop(fixture.shutdown);
        fixture.handle.await.unwrap();

        assert_eq!(fixture.shared.state(), State::Closed);
    }
}
