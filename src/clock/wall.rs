//! Fixed-period wall-clock tick source.

use crate::clock::{Clock, Tick};

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};

/// A tick source that fires once per fixed wall-clock period.
///
/// The first tick arrives one full period after the clock is first polled,
/// so a freshly started breaker always gets a complete first interval.
/// Missed ticks are skipped, never coalesced or replayed: if the event loop
/// falls behind, the clock resumes on the next period boundary.
#[derive(Debug)]
pub struct WallClock {
    period: Duration,
    interval: Option<Interval>,
}

impl WallClock {
    /// Creates a wall clock with the given tick period.
    ///
    /// The period must be non-zero; breaker configuration validation
    /// enforces this before a `WallClock` is ever constructed from it.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl Clock for WallClock {
    async fn next_tick(&mut self) -> Tick {
        // The interval is created lazily so that construction does not
        // require a running runtime; only polling does.
        let period = self.period;
        let interval = self.interval.get_or_insert_with(|| {
            let start = time::Instant::now() + period;
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        interval.tick().await;
        Tick::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let period = Duration::from_secs(1);
        let mut clock = WallClock::new(period);

        let before = time::Instant::now();
        clock.next_tick().await;
        assert!(before.elapsed() >= period);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_are_periodic() {
        let period = Duration::from_millis(100);
        let mut clock = WallClock::new(period);

        let before = time::Instant::now();
        for _ in 0..3 {
            clock.next_tick().await;
        }
        assert!(before.elapsed() >= period * 3);
    }

    #[test]
    fn test_period_accessor() {
        let clock = WallClock::new(Duration::from_secs(2));
        assert_eq!(clock.period(), Duration::from_secs(2));
    }
}
