//! Request and result types exchanged with the engine

use crate::engine::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result field holding the raw pressure field
pub const PRESSURE_FIELD: &str = "pressure";

/// Result field holding the signed production rate
pub const PROD_RATE_FIELD: &str = "prod_rate";

/// Arguments of one engine call
///
/// Field names are the engine's argument names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    /// Injection rate `u`
    #[serde(rename = "u")]
    pub injection_rate: f64,
    /// Timestep
    pub dt: f64,
    /// Whether this call (re)initializes the engine state
    pub reset: bool,
    /// Initial pressure, only read by the engine on reset
    pub initial_pressure: f64,
    /// Initial permeability, only read by the engine on reset
    pub initial_permeability: f64,
}

impl StepRequest {
    /// The one-time initialization call. Carries no injection.
    pub fn reset(dt: f64, initial_pressure: f64, initial_permeability: f64) -> Self {
        Self {
            injection_rate: 0.0,
            dt,
            reset: true,
            initial_pressure,
            initial_permeability,
        }
    }

    /// A stepping call holding `injection_rate` for `dt`
    pub fn step(injection_rate: f64, dt: f64) -> Self {
        Self {
            injection_rate,
            dt,
            reset: false,
            initial_pressure: 0.0,
            initial_permeability: 0.0,
        }
    }
}

/// Raw engine output for one call
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Raw pressure values in engine units (Pa), flattened in row order
    pub pressure_field: Vec<f64>,
    /// Signed production rate; the sign encodes injection vs. production
    pub production_rate: f64,
}

impl StepResult {
    /// Validate and extract a result from an engine reply
    ///
    /// Matrix-shaped pressure fields are flattened. The field must be
    /// non-empty and every number finite.
    pub fn from_value(value: &Value) -> Result<Self, EngineError> {
        let object = value
            .as_object()
            .ok_or_else(|| EngineError::call(format!("Expected an object result, got {}", kind(value))))?;

        let pressure = object
            .get(PRESSURE_FIELD)
            .ok_or_else(|| EngineError::call(format!("Result is missing '{}'", PRESSURE_FIELD)))?;
        let prod_rate = object
            .get(PROD_RATE_FIELD)
            .ok_or_else(|| EngineError::call(format!("Result is missing '{}'", PROD_RATE_FIELD)))?;

        let mut pressure_field = Vec::new();
        flatten_numbers(pressure, &mut pressure_field)?;
        if pressure_field.is_empty() {
            return Err(EngineError::call(format!("'{}' is empty", PRESSURE_FIELD)));
        }

        let production_rate = scalar(prod_rate)
            .ok_or_else(|| EngineError::call(format!("'{}' is not a finite number", PROD_RATE_FIELD)))?;

        Ok(Self {
            pressure_field,
            production_rate,
        })
    }
}

/// Collect numbers from arbitrarily nested arrays. A bare number counts as a
/// one-element field.
fn flatten_numbers(value: &Value, out: &mut Vec<f64>) -> Result<(), EngineError> {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_numbers(item, out)?;
            }
            Ok(())
        }
        Value::Number(n) => match n.as_f64().filter(|v| v.is_finite()) {
            Some(v) => {
                out.push(v);
                Ok(())
            }
            None => Err(EngineError::call(format!(
                "'{}' contains a non-finite value",
                PRESSURE_FIELD
            ))),
        },
        other => Err(EngineError::call(format!(
            "'{}' contains a {} value",
            PRESSURE_FIELD,
            kind(other)
        ))),
    }
}

/// A finite number, or a one-element array holding one
fn scalar(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::Array(items) if items.len() == 1 => scalar(&items[0]),
        _ => None,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_names() {
        let json = serde_json::to_value(StepRequest::step(150.0, 0.1)).unwrap();
        assert_eq!(json["u"], 150.0);
        assert_eq!(json["reset"], false);
        assert_eq!(json["initial_pressure"], 0.0);
    }

    #[test]
    fn test_reset_request_carries_initial_conditions() {
        let req = StepRequest::reset(0.1, 100.0, 100.0);
        assert!(req.reset);
        assert_eq!(req.injection_rate, 0.0);
        assert_eq!(req.initial_pressure, 100.0);
        assert_eq!(req.initial_permeability, 100.0);
    }

    #[test]
    fn test_parse_flat_result() {
        let result = StepResult::from_value(&json!({
            "pressure": [1.0e7, 2.0e7, 1.5e7],
            "prod_rate": -123.4
        }))
        .unwrap();
        assert_eq!(result.pressure_field, vec![1.0e7, 2.0e7, 1.5e7]);
        assert_eq!(result.production_rate, -123.4);
    }

    #[test]
    fn test_parse_matrix_pressure_and_boxed_scalar() {
        let result = StepResult::from_value(&json!({
            "pressure": [[1.0, 2.0], [3.0, 4.0]],
            "prod_rate": [5.0]
        }))
        .unwrap();
        assert_eq!(result.pressure_field, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(result.production_rate, 5.0);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let err = StepResult::from_value(&json!({"prod_rate": 1.0})).unwrap_err();
        assert!(err.to_string().contains("pressure"));

        let err = StepResult::from_value(&json!({"pressure": [1.0]})).unwrap_err();
        assert!(err.to_string().contains("prod_rate"));
    }

    #[test]
    fn test_malformed_values_rejected() {
        assert!(StepResult::from_value(&json!({"pressure": [], "prod_rate": 1.0})).is_err());
        assert!(StepResult::from_value(&json!({"pressure": ["x"], "prod_rate": 1.0})).is_err());
        assert!(StepResult::from_value(&json!({"pressure": [1.0], "prod_rate": "fast"})).is_err());
        assert!(StepResult::from_value(&json!([1.0, 2.0])).is_err());
        assert!(StepResult::from_value(&Value::Null).is_err());
    }
}
