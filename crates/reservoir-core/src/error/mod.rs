//! Error types for reservoir-loop
//!
//! Run-level failures are expressed as [`SimError`]. Every variant is fatal
//! for the run: nothing is retried, and the session is closed before the
//! error reaches the caller.

mod constructors;
mod conversions;
mod types;

pub use types::{SimError, SimResult};
