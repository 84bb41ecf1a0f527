//! Periodic progress reporting

use crate::telemetry::TelemetryRecord;
use tracing::info;

/// Emits a progress line every `interval` completed steps
///
/// Purely observational: it reads records and never feeds anything back
/// into the controller.
#[derive(Debug, Clone)]
pub struct ResultLogger {
    interval: usize,
    total_steps: usize,
}

impl ResultLogger {
    /// Create a logger for a run of `total_steps`
    pub fn new(interval: usize, total_steps: usize) -> Self {
        Self {
            interval: interval.max(1),
            total_steps,
        }
    }

    /// Report on a completed step, returning the line if one was due
    pub fn observe(&self, record: &TelemetryRecord) -> Option<String> {
        if record.step % self.interval != 0 {
            return None;
        }

        let line = format_progress(record, self.total_steps);
        info!(
            step = record.step,
            total = self.total_steps,
            elapsed = record.elapsed_time,
            "{}",
            line
        );
        Some(line)
    }
}

/// Progress line with fixed 2-decimal precision
pub fn format_progress(record: &TelemetryRecord, total_steps: usize) -> String {
    format!(
        "Step {}/{} | Max P: {:.2} Bar | Prod Rate: {:.2} m3/day",
        record.step, total_steps, record.max_pressure_bar, record.production_rate
    )
}
