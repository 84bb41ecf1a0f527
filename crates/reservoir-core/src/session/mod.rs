//! Engine session lifecycle
//!
//! A [`SessionManager`] hands out at most one live [`SimulationSession`] at a
//! time. A session is started once, invoked any number of times, and closed
//! exactly once; [`SessionManager::with_session`] guarantees the close on
//! every exit path of the work it wraps.

mod manager;

pub use manager::{SessionManager, SimulationSession};
