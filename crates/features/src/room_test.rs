//! Tests for the room heuristic

use super::*;

#[test]
fn test_area_name_wins() {
    assert_eq!(
        extract_room("sensor.kitchen_temp", Some("Server Closet")),
        Some("Server Closet".to_string())
    );
}

#[test]
fn test_blank_area_name_falls_through() {
    assert_eq!(
        extract_room("sensor.kitchen_temp", Some("   ")),
        Some("kitchen".to_string())
    );
}

#[test]
fn test_single_token_match() {
    assert_eq!(
        extract_room("sensor.garage_door_status", None),
        Some("garage".to_string())
    );
}

#[test]
fn test_two_token_match_beats_single() {
    assert_eq!(
        extract_room("sensor.master_bedroom_humidity", None),
        Some("master_bedroom".to_string())
    );
    assert_eq!(
        extract_room("light.living_room_lamp", None),
        Some("living_room".to_string())
    );
}

#[test]
fn test_no_match() {
    assert_eq!(extract_room("sensor.wan_download_speed", None), None);
    assert_eq!(extract_room("no_dot_at_all", None), None);
}
