//! The public circuit breaker API.

use crate::breaker::{BreakerConfig, BreakerMetrics, EventLoop, Machine, ReportMsg, Shared};
use crate::clock::{Clock, WallClock};
use crate::core::{BreakerError, BreakerResult, Outcome, State};

use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

/// A circuit breaker that isolates a failing downstream dependency.
///
/// The breaker observes outcome reports and a fixed-period clock, and moves
/// between three states:
///
/// - **Closed**: failures are counted per interval; reaching the threshold
///   within one interval trips the circuit.
/// - **Open**: reports are ignored while the configured number of intervals
///   elapses.
/// - **Half-Open**: the next reported outcome decides; a success closes the
///   circuit, a failure leaves it half-open for the next probe.
///
/// The breaker never invokes the dependency itself. Callers consult
/// [`state`](Self::state) or [`call_permitted`](Self::call_permitted)
/// before attempting a call and report the outcome afterwards.
///
/// # Lifecycle
///
/// [`start`](Self::start) spawns the event loop and the clock;
/// [`stop`](Self::stop) tears both down and waits for the loop to exit, so
/// no background task outlives it. A stopped breaker reads as `Closed` with
/// zero counters and may be started again. Reporting to a breaker that is
/// not running returns [`BreakerError::NotRunning`] instead of hanging.
///
/// Dropping a running breaker without stopping it closes both event
/// channels; the loop notices and winds down on its own, just not
/// synchronously with the drop.
///
/// # Example
///
/// ```rust,ignore
/// use tripswitch::{Breaker, BreakerConfig};
///
/// let mut breaker = Breaker::new(BreakerConfig::default())?;
/// breaker.start()?;
///
/// if breaker.call_permitted() {
///     match call_dependency().await {
///         Ok(_) => breaker.report_success().await?,
///         Err(_) => breaker.report_failure().await?,
///     }
/// }
///
/// breaker.stop().await?;
/// ```
pub struct Breaker {
    config: BreakerConfig,
    shared: Arc<Shared>,
    running: Option<Running>,
}

/// Channels and task handle for the current run.
struct Running {
    reports: mpsc::Sender<ReportMsg>,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Breaker {
    /// Creates a breaker with the given configuration.
    ///
    /// Fails fast on an invalid configuration; no breaker exists until the
    /// thresholds have been checked.
    pub fn new(config: BreakerConfig) -> BreakerResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shared: Arc::new(Shared::new()),
            running: None,
        })
    }

    /// Creates a breaker from a failure threshold and an open timeout in
    /// intervals, with the default one-second interval.
    pub fn with_thresholds(threshold: u32, timeout: u32) -> BreakerResult<Self> {
        Self::new(
            BreakerConfig::new()
                .with_threshold(threshold)
                .with_timeout(timeout),
        )
    }

    /// Starts the breaker with a wall clock ticking at the configured
    /// interval.
    ///
    /// Spawns the background event loop; must be called from within a tokio
    /// runtime. Returns [`BreakerError::AlreadyRunning`] if the breaker is
    /// already started.
    pub fn start(&mut self) -> BreakerResult<()> {
        let clock = WallClock::new(self.config.interval);
        self.start_with_clock(clock)
    }

    /// Starts the breaker with a caller-supplied tick source.
    ///
    /// This is how tests drive the breaker deterministically with a
    /// [`ManualClock`](crate::clock::ManualClock) instead of real time.
    pub fn start_with_clock<C: Clock>(&mut self, clock: C) -> BreakerResult<()> {
        if self.running.is_some() {
            return Err(BreakerError::AlreadyRunning);
        }

        let machine = Machine::new(&self.config, Arc::clone(&self.shared));

        // Capacity one gives a near-rendezvous handoff: a producer's send
        // suspends while the loop is busy, which is the backpressure the
        // design wants.
        let (report_tx, report_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let event_loop = EventLoop::new(report_rx, Box::new(clock), shutdown_rx, machine);
        let handle = tokio::spawn(event_loop.run());

        self.running = Some(Running {
            reports: report_tx,
            shutdown: shutdown_tx,
            handle,
        });

        tracing::debug!(
            threshold = self.config.threshold,
            timeout = self.config.timeout,
            "breaker started"
        );
        Ok(())
    }

    /// Stops the breaker.
    ///
    /// Signals the event loop, waits for it to drain and exit, and releases
    /// the clock. When this returns, no background task remains and the
    /// breaker reads as freshly constructed: `Closed`, zero counters. The
    /// breaker may be started again afterwards.
    pub async fn stop(&mut self) -> BreakerResult<()> {
        let running = self.running.take().ok_or(BreakerError::NotRunning)?;

        // The loop may already have exited on its own; then the signal has
        // no receiver, and the join below still completes.
        let _ = running.shutdown.send(());
        let _ = running.handle.await;

        self.shared.reset_metrics();
        tracing::debug!("breaker stopped");
        Ok(())
    }

    /// Reports the outcome of one call attempt.
    ///
    /// This is a synchronous handoff: the future resolves once the event
    /// loop has consumed the report. If the loop is busy the caller waits,
    /// which applies natural backpressure; per-event work is O(1), so the
    /// wait is short. There is no way to abandon a submitted report.
    ///
    /// Returns [`BreakerError::NotRunning`] if the breaker is not running.
    pub async fn report(&self, outcome: Outcome) -> BreakerResult<()> {
        let running = self.running.as_ref().ok_or(BreakerError::NotRunning)?;
        submit(&running.reports, outcome).await
    }

    /// Reports a successful call attempt.
    pub async fn report_success(&self) -> BreakerResult<()> {
        self.report(Outcome::Success).await
    }

    /// Reports a failed call attempt.
    pub async fn report_failure(&self) -> BreakerResult<()> {
        self.report(Outcome::Failure).await
    }

    /// Returns the current state snapshot.
    ///
    /// Safe to call at any time, running or not. The value reflects the
    /// most recently processed event, not necessarily the instant of the
    /// call; a report accepted but not yet processed is not visible. It is
    /// never a torn or invalid value.
    pub fn state(&self) -> State {
        self.shared.state()
    }

    /// Returns a receiver that can be awaited for state changes.
    ///
    /// Only real transitions wake subscribers; sweeps and ignored events do
    /// not. Receivers stay valid across stop/start cycles.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.shared.subscribe()
    }

    /// Returns a cloneable handle for submitting reports from other tasks.
    ///
    /// The handle is bound to the current run: after the breaker stops, its
    /// reports fail with [`BreakerError::NotRunning`].
    pub fn reporter(&self) -> BreakerResult<Reporter> {
        let running = self.running.as_ref().ok_or(BreakerError::NotRunning)?;
        Ok(Reporter {
            reports: running.reports.clone(),
        })
    }

    /// Returns a copy of the lifetime metrics for the current run.
    pub fn metrics(&self) -> BreakerMetrics {
        self.shared.metrics()
    }

    /// Returns `true` if the event loop is running.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Returns `true` if callers should currently attempt the dependency.
    ///
    /// Closed and half-open circuits permit calls; an open circuit does
    /// not. In half-open, the next reported outcome settles recovery.
    pub fn call_permitted(&self) -> bool {
        !self.state().is_open()
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }
}

impl fmt::Debug for Breaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breaker")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("running", &self.running.is_some())
            .finish()
    }
}

/// A cloneable report submission handle, valid for one breaker run.
///
/// Obtained from [`Breaker::reporter`]. Lets producer tasks report outcomes
/// without sharing the `Breaker` itself.
#[derive(Debug, Clone)]
pub struct Reporter {
    reports: mpsc::Sender<ReportMsg>,
}

impl Reporter {
    /// Reports the outcome of one call attempt.
    ///
    /// Same handoff semantics as [`Breaker::report`].
    pub async fn report(&self, outcome: Outcome) -> BreakerResult<()> {
        submit(&self.reports, outcome).await
    }

    /// Reports a successful call attempt.
    pub async fn report_success(&self) -> BreakerResult<()> {
        self.report(Outcome::Success).await
    }

    /// Reports a failed call attempt.
    pub async fn report_failure(&self) -> BreakerResult<()> {
        self.report(Outcome::Failure).await
    }
}

async fn submit(reports: &mpsc::Sender<ReportMsg>, outcome: Outcome) -> BreakerResult<()> {
    let (done_tx, done_rx) = oneshot::channel();
    reports
        .send(ReportMsg {
            outcome,
            done: done_tx,
        })
        .await
        .map_err(|_| BreakerError::NotRunning)?;
    // The loop acknowledges after processing. If it shut down between the
    // send and the ack, the report was never applied; surface that.
    done_rx.await.map_err(|_| BreakerError::NotRunning)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, ManualClockHandle};

    fn started(threshold: u32, timeout: u32) -> (Breaker, ManualClockHandle) {
        let mut breaker = Breaker::with_thresholds(threshold, timeout).unwrap();
        let (clock, handle) = ManualClock::new();
        breaker.start_with_clock(clock).unwrap();
        (breaker, handle)
    }

    #[test]
    fn test_invalid_construction_fails_fast() {
        assert!(matches!(
            Breaker::with_thresholds(0, 3),
            Err(BreakerError::InvalidThreshold { value: 0 })
        ));
        assert!(matches!(
            Breaker::with_thresholds(2, 0),
            Err(BreakerError::InvalidTimeout { value: 0 })
        ));
    }

    #[tokio::test]
    async fn test_starts_in_closed_state() {
        let (mut breaker, _clock) = started(2, 3);
        assert_eq!(breaker.state(), State::Closed);
        assert!(breaker.call_permitted());
        breaker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_threshold_behavior() {
        let (mut breaker, clock) = started(2, 3);

        // One failure in an interval stays under the threshold.
        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);

        // Two failures within one interval trip the circuit.
        breaker.report_failure().await.unwrap();
        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);
        assert!(!breaker.call_permitted());

        breaker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_counter_sweeps_every_interval() {
        let (mut breaker, clock) = started(2, 3);

        // One failure per interval never accumulates to the threshold.
        for _ in 0..4 {
            breaker.report_failure().await.unwrap();
            clock.advance().await.unwrap();
            assert_eq!(breaker.state(), State::Closed);
        }

        breaker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_state_ignores_reports() {
        let (mut breaker, clock) = started(1, 3);

        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);

        for _ in 0..5 {
            breaker.report_failure().await.unwrap();
            breaker.report_success().await.unwrap();
        }
        assert_eq!(breaker.state(), State::Open);

        // Reports did not disturb the open countdown: two more ticks are
        // still needed before the probe window.
        clock.advance().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::HalfOpen);

        breaker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_half_open_resolution() {
        let (mut breaker, clock) = started(1, 1);

        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::HalfOpen);
        assert!(breaker.call_permitted());

        // A failed probe leaves the circuit half-open.
        breaker.report_failure().await.unwrap();
        assert_eq!(breaker.state(), State::HalfOpen);

        // Ticks do not expire the probe; it is paced by the caller.
        clock.advance_many(5).await.unwrap();
        assert_eq!(breaker.state(), State::HalfOpen);

        // A successful probe restores traffic.
        breaker.report_success().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);

        breaker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let (mut breaker, clock) = started(2, 3);

        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);

        breaker.report_failure().await.unwrap();
        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);

        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);

        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);

        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::HalfOpen);

        breaker.report_success().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);

        breaker.stop().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);
    }

    #[tokio::test]
    async fn test_stop_resets_state() {
        let (mut breaker, clock) = started(1, 10);

        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);

        breaker.stop().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);
        assert!(!breaker.is_running());
        assert_eq!(breaker.metrics().total_reports(), 0);
    }

    #[tokio::test]
    async fn test_restart_behaves_like_new() {
        let (mut breaker, clock) = started(2, 3);

        breaker.report_failure().await.unwrap();
        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);
        breaker.stop().await.unwrap();

        // Second run: the counter starts from zero again.
        let (clock, handle) = ManualClock::new();
        breaker.start_with_clock(clock).unwrap();
        breaker.report_failure().await.unwrap();
        handle.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);

        breaker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_misuse_is_an_error_not_a_hang() {
        let mut breaker = Breaker::with_thresholds(2, 3).unwrap();

        assert!(matches!(
            breaker.report_failure().await,
            Err(BreakerError::NotRunning)
        ));
        assert!(matches!(breaker.stop().await, Err(BreakerError::NotRunning)));
        assert!(matches!(breaker.reporter(), Err(BreakerError::NotRunning)));

        let (clock, _handle) = ManualClock::new();
        breaker.start_with_clock(clock).unwrap();
        let (clock2, _handle2) = ManualClock::new();
        assert!(matches!(
            breaker.start_with_clock(clock2),
            Err(BreakerError::AlreadyRunning)
        ));

        breaker.stop().await.unwrap();
        assert!(matches!(
            breaker.report_success().await,
            Err(BreakerError::NotRunning)
        ));
    }

    #[tokio::test]
    async fn test_reporter_handle_submits_reports() {
        let (mut breaker, clock) = started(2, 3);
        let reporter = breaker.reporter().unwrap();

        let worker = tokio::spawn(async move {
            reporter.report_failure().await?;
            reporter.report_failure().await?;
            Ok::<_, BreakerError>(())
        });
        worker.await.unwrap().unwrap();

        clock.advance().await.unwrap();
        assert_eq!(breaker.state(), State::Open);

        let reporter = breaker.reporter().unwrap();
        breaker.stop().await.unwrap();
        assert!(matches!(
            reporter.report_success().await,
            Err(BreakerError::NotRunning)
        ));
    }

    #[tokio::test]
    async fn test_subscribe_observes_transitions() {
        let (mut breaker, clock) = started(1, 1);
        let mut states = breaker.subscribe();

        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap();
        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), State::Open);

        clock.advance().await.unwrap();
        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), State::HalfOpen);

        breaker.report_success().await.unwrap();
        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), State::Closed);

        breaker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_metrics_track_the_run() {
        let (mut breaker, clock) = started(1, 1);

        breaker.report_failure().await.unwrap();
        clock.advance().await.unwrap(); // opens
        breaker.report_success().await.unwrap(); // ignored while open
        clock.advance().await.unwrap(); // half-open
        breaker.report_success().await.unwrap(); // closes

        let metrics = breaker.metrics();
        assert_eq!(metrics.failure_reports, 1);
        assert_eq!(metrics.ignored_reports, 1);
        assert_eq!(metrics.success_reports, 1);
        assert_eq!(metrics.times_opened, 1);
        assert_eq!(metrics.times_closed, 1);
        assert_eq!(metrics.ticks, 2);

        breaker.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_clock_run() {
        use std::time::Duration;

        let config = BreakerConfig::new()
            .with_threshold(1)
            .with_timeout(2)
            .with_interval(Duration::from_millis(50));
        let mut breaker = Breaker::new(config).unwrap();
        breaker.start().unwrap();

        breaker.report_failure().await.unwrap();

        // Under the paused runtime the interval fires as soon as the loop
        // is otherwise idle; wait out the trip and the open timeout.
        let mut states = breaker.subscribe();
        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), State::Open);

        states.changed().await.unwrap();
        assert_eq!(*states.borrow_and_update(), State::HalfOpen);

        breaker.report_success().await.unwrap();
        assert_eq!(breaker.state(), State::Closed);

        breaker.stop().await.unwrap();
    }
}
