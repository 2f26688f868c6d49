//! Tests for occupancy inference

use super::*;
use serde_json::json;

fn attrs(value: serde_json::Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[test]
fn test_no_signals_yields_none() {
    let empty = Map::new();
    assert!(infer_occupancy(DeviceCategory::Other, Some("idle"), &empty, None, None).is_none());
}

#[test]
fn test_high_co2_alone() {
    let a = attrs(json!({"carbon_dioxide": 900}));
    let occ = infer_occupancy(DeviceCategory::Other, None, &a, None, None).unwrap();
    assert!((occ.score - 1.0).abs() < 1e-9);
    // Single signal with weight 0.5
    assert_eq!(occ.confidence, OccupancyConfidence::Medium);
}

#[test]
fn test_low_co2_is_strong_absence() {
    let a = attrs(json!({"co2": 400}));
    let occ = infer_occupancy(DeviceCategory::Other, None, &a, None, None).unwrap();
    assert_eq!(occ.score, 0.0);
    assert_eq!(occ.confidence, OccupancyConfidence::Medium);
}

#[test]
fn test_mid_co2_band_has_low_weight() {
    let a = attrs(json!({"co2": 500}));
    let occ = infer_occupancy(DeviceCategory::Other, None, &a, None, None).unwrap();
    assert!((occ.score - 0.3).abs() < 1e-9);
    // Weight 0.3 < 0.5, so a lone mid-band reading is low confidence
    assert_eq!(occ.confidence, OccupancyConfidence::Low);
}

#[test]
fn test_air_quality_state_is_co2() {
    let empty = Map::new();
    let occ =
        infer_occupancy(DeviceCategory::AirQuality, Some("850"), &empty, Some(850.0), None)
            .unwrap();
    assert!((occ.score - 1.0).abs() < 1e-9);
}

#[test]
fn test_motion_on() {
    let empty = Map::new();
    let occ = infer_occupancy(DeviceCategory::Motion, Some("on"), &empty, None, None).unwrap();
    assert!((occ.score - 1.0).abs() < 1e-9);
    assert_eq!(occ.confidence, OccupancyConfidence::Low);

    assert!(infer_occupancy(DeviceCategory::Motion, Some("off"), &empty, None, None).is_none());
}

#[test]
fn test_power_threshold() {
    let empty = Map::new();
    let occ =
        infer_occupancy(DeviceCategory::Power, None, &empty, Some(120.0), Some(120.0)).unwrap();
    assert!((occ.score - 0.6).abs() < 1e-9);
    assert_eq!(occ.confidence, OccupancyConfidence::Low);

    // At or below 50 W the signal is absent, not zero
    assert!(infer_occupancy(DeviceCategory::Power, None, &empty, Some(30.0), Some(30.0)).is_none());
}

#[test]
fn test_two_signals_are_high_confidence() {
    let a = attrs(json!({"carbon_dioxide": 900}));
    let occ = infer_occupancy(DeviceCategory::Other, None, &a, None, Some(200.0)).unwrap();
    // (1.0 * 0.5 + 0.6 * 0.2) / 0.7
    assert!((occ.score - 0.62 / 0.7).abs() < 1e-9);
    assert_eq!(occ.confidence, OccupancyConfidence::High);
}
