//! Calendar and cyclic time features
//!
//! Cyclic encodings exist so hour 23 and hour 0 are numerically adjacent
//! for downstream models instead of 23 units apart.

use chrono::{DateTime, Datelike, Timelike, Utc};
use hearth_record::{Season, TimeOfDay};

#[cfg(test)]
#[path = "time_test.rs"]
mod tests;

/// Attribute-only updates land with equal timestamps, modulo rounding
const STATE_CHANGED_TOLERANCE_MS: i64 = 1_000;

/// Calendar features derived from the row's canonical timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeFeatures {
    /// 0-23
    pub hour_of_day: u32,
    /// Monday = 0 .. Sunday = 6
    pub day_of_week: u32,
    /// 1-12
    pub month: u32,
    pub is_weekend: bool,
    pub is_night: bool,
    pub time_of_day: TimeOfDay,
    pub season: Season,
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub day_sin: f64,
    pub day_cos: f64,
}

/// Derive calendar features and cyclic encodings from a timestamp
pub fn extract_time(timestamp: DateTime<Utc>) -> TimeFeatures {
    let hour = timestamp.hour();
    let day = timestamp.weekday().num_days_from_monday();
    let month = timestamp.month();

    let hour_angle = 2.0 * std::f64::consts::PI * f64::from(hour) / 24.0;
    let day_angle = 2.0 * std::f64::consts::PI * f64::from(day) / 7.0;

    TimeFeatures {
        hour_of_day: hour,
        day_of_week: day,
        month,
        is_weekend: day >= 5,
        is_night: !(6..21).contains(&hour),
        time_of_day: time_of_day(hour),
        season: season(month),
        hour_sin: hour_angle.sin(),
        hour_cos: hour_angle.cos(),
        day_sin: day_angle.sin(),
        day_cos: day_angle.cos(),
    }
}

/// Whether the row's timestamps mark a real state change
///
/// Attribute-only updates carry equal timestamps within rounding
/// tolerance; a gap wider than the tolerance marks a state change.
pub fn state_changed(last_changed: DateTime<Utc>, last_updated: DateTime<Utc>) -> bool {
    // Source timestamps carry sub-second precision; compare in ms so a
    // 1.5 s gap does not truncate down to the tolerance.
    (last_changed - last_updated).num_milliseconds().abs() > STATE_CHANGED_TOLERANCE_MS
}

fn time_of_day(hour: u32) -> TimeOfDay {
    match hour {
        6..=11 => TimeOfDay::Morning,
        12..=16 => TimeOfDay::Afternoon,
        17..=20 => TimeOfDay::Evening,
        _ => TimeOfDay::Night,
    }
}

/// Northern-hemisphere month grouping
fn season(month: u32) -> Season {
    match month {
        12 | 1 | 2 => Season::Winter,
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        _ => Season::Autumn,
    }
}
