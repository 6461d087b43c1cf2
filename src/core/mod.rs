//! Core types for the tripswitch library.
//!
//! This module contains the fundamental value types shared by every layer:
//! the circuit [`State`], the reported [`Outcome`], and the error surface.

mod error;
mod types;

pub use error::{BreakerError, BreakerResult};
pub use types::{Outcome, State};
