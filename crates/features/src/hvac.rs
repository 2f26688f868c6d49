//! HVAC feature extraction
//!
//! Pulled from attributes when the row is climate-shaped. The state string
//! doubles as the mode when the attributes lack one, and a parsed numeric
//! state stands in for the current temperature.

use serde_json::{Map, Value};

#[cfg(test)]
#[path = "hvac_test.rs"]
mod tests;

/// Climate features for hvac-category rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HvacFeatures {
    pub hvac_mode: Option<String>,
    pub hvac_action: Option<String>,
    pub fan_mode: Option<String>,
    pub target_temperature: Option<f64>,
    pub current_temperature: Option<f64>,
}

/// Extract HVAC features from a climate-shaped row
pub fn extract_hvac(
    state: Option<&str>,
    attributes: &Map<String, Value>,
    numeric_state: Option<f64>,
) -> HvacFeatures {
    let hvac_mode = attr_string(attributes, "hvac_mode")
        .or_else(|| state.map(str::to_string));

    HvacFeatures {
        hvac_mode,
        hvac_action: attr_string(attributes, "hvac_action"),
        fan_mode: attr_string(attributes, "fan_mode"),
        target_temperature: attr_number(attributes, "temperature"),
        current_temperature: attr_number(attributes, "current_temperature").or(numeric_state),
    }
}

fn attr_string(attributes: &Map<String, Value>, key: &str) -> Option<String> {
    match attributes.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn attr_number(attributes: &Map<String, Value>, key: &str) -> Option<f64> {
    match attributes.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}
