//! # Tripswitch
//!
//! A failure-isolation circuit breaker built around a single-consumer event
//! loop, with injectable clocks for deterministic testing.
//!
//! ## Overview
//!
//! A [`Breaker`] watches the outcomes of calls to a downstream dependency
//! and trips when the dependency looks unhealthy:
//!
//! - Callers report each attempt as a success or a failure
//! - Failures are counted per fixed clock interval while the circuit is closed
//! - When the per-interval count reaches the threshold, the circuit opens
//!   and callers should stop attempting calls
//! - After a configured number of intervals the circuit goes half-open and
//!   the next reported outcome decides whether it closes again
//!
//! The breaker never calls the dependency itself. Calling code checks
//! [`Breaker::state`] (or [`Breaker::call_permitted`]) before attempting a
//! call and reports the outcome afterwards.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tripswitch::{Breaker, BreakerConfig, Outcome};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BreakerConfig::new()
//!         .with_threshold(5)
//!         .with_timeout(30)
//!         .with_interval(Duration::from_secs(1));
//!
//!     let mut breaker = Breaker::new(config)?;
//!     breaker.start()?;
//!
//!     if breaker.call_permitted() {
//!         let failed = call_the_dependency().await.is_err();
//!         breaker.report(Outcome::from_failed(failed)).await?;
//!     }
//!
//!     breaker.stop().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into three layers:
//!
//! - **Core**: state and outcome types plus error handling
//! - **Clock**: the tick source abstraction ([`WallClock`] for production,
//!   [`ManualClock`] for deterministic tests)
//! - **Breaker**: the public API and the event loop that owns all mutable
//!   state
//!
//! All mutation happens on one background task. Callers hand events to that
//! task over channels, which makes every transition linearizable without a
//! single lock on the state itself.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod breaker;
pub mod clock;
pub mod core;

// Re-export commonly used types at the crate root
pub use crate::breaker::{Breaker, BreakerConfig, BreakerMetrics, Reporter};
pub use crate::clock::{Clock, ManualClock, ManualClockHandle, Tick, WallClock};
pub use crate::core::{BreakerError, BreakerResult, Outcome, State};
