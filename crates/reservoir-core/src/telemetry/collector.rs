//! Unit normalization and accumulation

use super::series::{TelemetryRecord, TelemetrySeries};
use crate::error::SimResult;
use crate::schedule::PlannedStep;
use crate::types::StepResult;

/// Engine pressure units per reporting unit (Pa per bar)
pub const PRESSURE_SCALE: f64 = 1e5;

/// Worst-case spatial pressure in bar
///
/// Every element is scaled before the maximum is taken. Returns `None` for an
/// empty field.
pub fn max_pressure_bar(pressure_field: &[f64]) -> Option<f64> {
    pressure_field
        .iter()
        .map(|p| p / PRESSURE_SCALE)
        .fold(None, |acc, p| Some(acc.map_or(p, |a: f64| a.max(p))))
}

/// Reported production: the sign only encodes injection vs. production
pub fn production_magnitude(production_rate: f64) -> f64 {
    production_rate.abs()
}

/// Accumulates normalized records for one run
#[derive(Debug, Default)]
pub struct TelemetryCollector {
    series: TelemetrySeries,
}

impl TelemetryCollector {
    /// Create a collector expecting `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            series: TelemetrySeries::with_capacity(capacity),
        }
    }

    /// Normalize the result of a completed step and append it
    pub fn ingest(&mut self, step: &PlannedStep, result: &StepResult) -> SimResult<TelemetryRecord> {
        // StepResult guarantees a non-empty field
        let max_pressure_bar = max_pressure_bar(&result.pressure_field).unwrap_or(f64::NAN);

        let record = TelemetryRecord {
            step: step.index,
            elapsed_time: step.elapsed,
            max_pressure_bar,
            production_rate: production_magnitude(result.production_rate),
        };
        self.series.push(record)?;
        Ok(record)
    }

    /// Records collected so far
    pub fn series(&self) -> &TelemetrySeries {
        &self.series
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Check if nothing has been collected
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Finish collection
    pub fn into_series(self) -> TelemetrySeries {
        self.series
    }
}
