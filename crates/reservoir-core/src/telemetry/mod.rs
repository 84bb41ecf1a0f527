//! Telemetry collection
//!
//! Turns raw engine results into an append-only series of reporting-unit
//! records, one per completed stepping call.

mod collector;
pub mod export;
mod series;

pub use collector::{TelemetryCollector, PRESSURE_SCALE, max_pressure_bar, production_magnitude};
pub use export::{PlotData, PlotPanel, ReferenceLine};
pub use series::{TelemetryRecord, TelemetrySeries};
