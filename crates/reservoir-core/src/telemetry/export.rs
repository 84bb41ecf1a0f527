//! Plot-ready export of a finished series
//!
//! Rendering is left to an external tool. This module only shapes the data:
//! a pressure panel with a reference line at the initial pressure and a
//! production panel, both against elapsed time.

use super::series::TelemetrySeries;
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One time-series panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPanel {
    /// Panel title
    pub title: String,
    /// X axis label
    pub x_label: String,
    /// Y axis label
    pub y_label: String,
    /// X values
    pub x: Vec<f64>,
    /// Y values
    pub y: Vec<f64>,
    /// Horizontal reference line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_line: Option<ReferenceLine>,
}

/// A labelled horizontal line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLine {
    /// Y value of the line
    pub value: f64,
    /// Legend label
    pub label: String,
}

/// Both panels of a run report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    /// Max pressure vs. elapsed time
    pub pressure: PlotPanel,
    /// Production magnitude vs. elapsed time
    pub production: PlotPanel,
    /// Whether the series covers every planned step
    pub complete: bool,
}

impl PlotData {
    /// Shape `series` for plotting
    pub fn from_series(
        series: &TelemetrySeries,
        initial_pressure: f64,
        injection_rate: f64,
        complete: bool,
    ) -> Self {
        let times = series.times();

        Self {
            pressure: PlotPanel {
                title: format!("Pressure (Injection = {} m^3/day)", injection_rate),
                x_label: "Time (Days)".to_string(),
                y_label: "Max Pressure (Bar)".to_string(),
                x: times.clone(),
                y: series.max_pressures(),
                reference_line: Some(ReferenceLine {
                    value: initial_pressure,
                    label: "Initial Pressure".to_string(),
                }),
            },
            production: PlotPanel {
                title: "Production".to_string(),
                x_label: "Time (Days)".to_string(),
                y_label: "Production Rate (m^3/day)".to_string(),
                x: times,
                y: series.production_rates(),
                reference_line: None,
            },
            complete,
        }
    }

    /// Write as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SimError::io(format!("Failed to serialize plot data: {}", e)))?;
        std::fs::write(path, json).map_err(|e| {
            SimError::io_with_path(format!("Failed to write plot data: {}", e), path)
        })
    }
}
