//! Best-effort occupancy inference
//!
//! Combines whatever signals the row happens to carry - CO2 level, motion
//! state, power draw - into a weighted score. Absent signals simply do not
//! contribute; a row with none yields no score at all.

use hearth_record::{DeviceCategory, OccupancyConfidence};
use serde_json::{Map, Value};

#[cfg(test)]
#[path = "occupancy_test.rs"]
mod tests;

/// Power draw above this suggests someone is using the device
const POWER_OCCUPIED_WATTS: f64 = 50.0;

/// Occupancy inference result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Occupancy {
    /// Weighted mean of the present signals, 0.0 - 1.0
    pub score: f64,
    pub confidence: OccupancyConfidence,
}

/// One contributing signal: (value, weight)
type Signal = (f64, f64);

/// Infer occupancy from the signals present on a single row
///
/// Returns `None` when the row carries no usable signal.
pub fn infer_occupancy(
    category: DeviceCategory,
    state: Option<&str>,
    attributes: &Map<String, Value>,
    numeric_state: Option<f64>,
    power_value: Option<f64>,
) -> Option<Occupancy> {
    let mut signals: Vec<Signal> = Vec::new();

    if let Some(ppm) = co2_level(category, attributes, numeric_state) {
        signals.push(co2_signal(ppm));
    }

    if category == DeviceCategory::Motion && state == Some("on") {
        signals.push((1.0, 0.3));
    }

    if let Some(watts) = power_value {
        if watts > POWER_OCCUPIED_WATTS {
            signals.push((0.6, 0.2));
        }
    }

    if signals.is_empty() {
        return None;
    }

    let total_weight: f64 = signals.iter().map(|(_, w)| w).sum();
    let score = signals.iter().map(|(v, w)| v * w).sum::<f64>() / total_weight;

    let confidence = if signals.len() >= 2 {
        OccupancyConfidence::High
    } else if signals[0].1 >= 0.5 {
        OccupancyConfidence::Medium
    } else {
        OccupancyConfidence::Low
    };

    Some(Occupancy { score, confidence })
}

/// CO2 parts-per-million, from a dedicated attribute or from the state of
/// an air-quality row
fn co2_level(
    category: DeviceCategory,
    attributes: &Map<String, Value>,
    numeric_state: Option<f64>,
) -> Option<f64> {
    for key in ["carbon_dioxide", "co2"] {
        if let Some(Value::Number(n)) = attributes.get(key) {
            return n.as_f64();
        }
    }

    if category == DeviceCategory::AirQuality {
        return numeric_state;
    }

    None
}

fn co2_signal(ppm: f64) -> Signal {
    if ppm > 800.0 {
        (1.0, 0.5)
    } else if ppm >= 600.0 {
        (0.7, 0.5)
    } else if ppm < 450.0 {
        (0.0, 0.5)
    } else {
        (0.3, 0.3)
    }
}
