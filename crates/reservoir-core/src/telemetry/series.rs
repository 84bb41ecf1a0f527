//! Telemetry series storage

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Normalized output of one completed stepping call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// 1-based step index
    pub step: usize,
    /// Simulated time after the step
    pub elapsed_time: f64,
    /// Maximum pressure over the field, in bar
    pub max_pressure_bar: f64,
    /// Magnitude of the production rate
    pub production_rate: f64,
}

/// Append-only, time-ordered telemetry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySeries {
    records: Vec<TelemetryRecord>,
}

impl TelemetrySeries {
    /// Create an empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty series with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a record
    ///
    /// The record must continue the step numbering and strictly advance
    /// elapsed time.
    pub(crate) fn push(&mut self, record: TelemetryRecord) -> SimResult<()> {
        let expected_step = self.records.len() + 1;
        if record.step != expected_step {
            return Err(SimError::session(format!(
                "Telemetry record for step {} out of order, expected step {}",
                record.step, expected_step
            )));
        }

        if let Some(last) = self.records.last() {
            if record.elapsed_time <= last.elapsed_time {
                return Err(SimError::session(format!(
                    "Telemetry time must strictly increase: {} after {}",
                    record.elapsed_time, last.elapsed_time
                )));
            }
        }

        self.records.push(record);
        Ok(())
    }

    /// All records in step order
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record
    pub fn last(&self) -> Option<&TelemetryRecord> {
        self.records.last()
    }

    /// Elapsed times in step order
    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.elapsed_time).collect()
    }

    /// Max pressures (bar) in step order
    pub fn max_pressures(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.max_pressure_bar).collect()
    }

    /// Production magnitudes in step order
    pub fn production_rates(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.production_rate).collect()
    }

    /// Highest pressure seen over the run
    pub fn peak_pressure(&self) -> Option<f64> {
        self.records
            .iter()
            .map(|r| r.max_pressure_bar)
            .fold(None, |acc, p| Some(acc.map_or(p, |a: f64| a.max(p))))
    }
}
