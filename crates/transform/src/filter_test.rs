use super::*;
use hearth_config::FilterConfig;

#[test]
fn include_mode_exports_only_matches() {
    let config = FilterConfig::default()
        .with_mode(FilterMode::Include)
        .with_include_pattern("sensor.*")
        .with_include_pattern("climate.living_room");
    let filter = EntityFilter::new(&config).unwrap();

    assert!(filter.should_export("sensor.kitchen_temperature"));
    assert!(filter.should_export("climate.living_room"));
    assert!(!filter.should_export("light.hallway"));
    assert!(!filter.should_export("climate.bedroom"));
}

#[test]
fn include_mode_with_empty_list_exports_nothing() {
    let config = FilterConfig::default().with_mode(FilterMode::Include);
    let filter = EntityFilter::new(&config).unwrap();

    assert!(!filter.should_export("sensor.anything"));
    assert_eq!(filter.pattern_count(), 0);
}

#[test]
fn exclude_mode_drops_only_matches() {
    let config = FilterConfig::default()
        .with_exclude_pattern("*.battery_level")
        .with_exclude_pattern("device_tracker.*");
    let filter = EntityFilter::new(&config).unwrap();

    assert!(!filter.should_export("sensor.phone_battery_level"));
    assert!(!filter.should_export("device_tracker.phone"));
    assert!(filter.should_export("sensor.kitchen_temperature"));
}

#[test]
fn exclude_mode_with_empty_list_exports_everything() {
    let filter = EntityFilter::new(&FilterConfig::default()).unwrap();
    assert!(filter.should_export("anything.at_all"));
}

#[test]
fn inactive_pattern_list_is_ignored() {
    // Exclude mode: the include list must have no effect.
    let config = FilterConfig::default()
        .with_include_pattern("sensor.*")
        .with_exclude_pattern("light.*");
    let filter = EntityFilter::new(&config).unwrap();

    assert!(filter.should_export("switch.anything"));
    assert!(!filter.should_export("light.hallway"));
    assert_eq!(filter.pattern_count(), 1);
}

#[test]
fn invalid_glob_is_rejected_at_construction() {
    let config = FilterConfig::default()
        .with_mode(FilterMode::Include)
        .with_include_pattern("sensor.[");
    assert!(EntityFilter::new(&config).is_err());
}

#[test]
fn invalid_glob_in_inactive_list_is_not_compiled() {
    let config = FilterConfig::default().with_include_pattern("sensor.[");
    assert!(EntityFilter::new(&config).is_ok());
}
