//! The circuit breaker: public API, configuration, and the event loop that
//! owns all mutable state.
//!
//! ## States
//!
//! - **Closed**: normal operation; failures are counted per clock interval.
//! - **Open**: tripped; callers should back off while the timeout elapses.
//! - **Half-Open**: probing; the next reported outcome decides recovery.
//!
//! ## State Transitions
//!
//! ```text
//! Closed → Open: failure count reaches the threshold within one interval
//! Open → Half-Open: after `timeout` intervals have elapsed
//! Half-Open → Closed: a probe succeeds
//! Half-Open → Half-Open: a probe fails (the circuit stays in probe mode)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tripswitch::{Breaker, BreakerConfig};
//! use std::time::Duration;
//!
//! let config = BreakerConfig::new()
//!     .with_threshold(5)
//!     .with_timeout(30)
//!     .with_interval(Duration::from_secs(1));
//!
//! let mut breaker = Breaker::new(config)?;
//! breaker.start()?;
//! ```

#[allow(clippy::module_inception)]
mod breaker;
mod config;
mod event_loop;
mod machine;
mod metrics;
mod shared;

pub use breaker::{Breaker, Reporter};
pub use config::BreakerConfig;
pub use metrics::BreakerMetrics;

pub(crate) use event_loop::{EventLoop, ReportMsg};
pub(crate) use machine::Machine;
pub(crate) use shared::Shared;
