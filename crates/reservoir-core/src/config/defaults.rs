//! Default values for configuration fields

/// Default run parameters
pub mod simulation {
    /// Control horizon in days
    pub const HORIZON: f64 = 10.0;

    /// Step length in days
    pub const DT: f64 = 0.1;

    /// Initial reservoir pressure in bar
    pub const INITIAL_PRESSURE: f64 = 100.0;

    /// Initial permeability passed to the reset call
    pub const PERMEABILITY: f64 = 100.0;

    /// Injection setpoint in m3/day
    pub const INJECTION_RATE: f64 = 150.0;

    /// Completed steps between progress lines
    pub const LOG_INTERVAL: usize = 10;
}

/// Default engine launch parameters
pub mod engine {
    /// Engine executable
    pub const COMMAND: &str = "reservoir-engine";

    /// Model function invoked on every call
    pub const ENTRY_POINT: &str = "random_initial_k";

    /// Outputs requested from the entry point
    pub const RESULT_ARITY: u32 = 1;

    /// Engine start-up can take minutes on a cold license server (2 minutes)
    pub const START_TIMEOUT_SECS: u64 = 120;

    /// Upper bound for one solver call (5 minutes)
    pub const CALL_TIMEOUT_SECS: u64 = 300;

    /// Grace period for the engine to exit after shutdown (5 seconds)
    pub const CLOSE_TIMEOUT_SECS: u64 = 5;
}
