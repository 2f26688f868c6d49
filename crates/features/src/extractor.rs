//! Top-level feature extraction
//!
//! Bundles the individual extractors into one pass over a raw row and
//! produces the full feature bag a [`hearth_record::TimelineRecord`]
//! carries.

use chrono::{DateTime, Utc};
use hearth_record::{DeviceCategory, TimelineRecord};
use serde_json::{Map, Value};

use crate::device::classify_device;
use crate::hvac::extract_hvac;
use crate::occupancy::infer_occupancy;
use crate::room::extract_room;
use crate::time::{extract_time, state_changed};
use crate::{HvacFeatures, Occupancy, TimeFeatures};

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;

/// Parse a state string as a float; absent or unparseable yields `None`
pub fn parse_numeric_state(state: Option<&str>) -> Option<f64> {
    state.and_then(|s| s.trim().parse::<f64>().ok()).filter(|v| v.is_finite())
}

/// Borrowed view of one raw row, everything the extractor needs
#[derive(Debug, Clone, Copy)]
pub struct FeatureInput<'a> {
    pub entity_id: &'a str,
    pub domain: Option<&'a str>,
    pub state: Option<&'a str>,
    pub attributes: &'a Map<String, Value>,
    pub area_name: Option<&'a str>,
    /// Canonical row time; drives the calendar features
    pub last_changed: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// The complete derived feature bag for one row
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    pub time: TimeFeatures,
    pub state_changed: bool,
    pub numeric_state: Option<f64>,
    pub room: Option<String>,
    pub device_category: DeviceCategory,
    pub temperature_value: Option<f64>,
    pub humidity_value: Option<f64>,
    pub power_value: Option<f64>,
    pub energy_value: Option<f64>,
    pub hvac: Option<HvacFeatures>,
    pub occupancy: Option<Occupancy>,
}

/// Run the full extraction over one row
pub fn extract(input: &FeatureInput<'_>) -> Features {
    let numeric_state = parse_numeric_state(input.state);
    let category = classify_device(input.entity_id, input.domain, input.attributes);

    // Domain numerics only when the category agrees and the state parsed
    let value_for = |wanted: DeviceCategory| -> Option<f64> {
        (category == wanted).then_some(numeric_state).flatten()
    };
    let temperature_value = value_for(DeviceCategory::Temperature);
    let humidity_value = value_for(DeviceCategory::Humidity);
    let power_value = value_for(DeviceCategory::Power);
    let energy_value = value_for(DeviceCategory::Energy);

    let hvac = if category == DeviceCategory::Hvac || input.domain == Some("climate") {
        Some(extract_hvac(input.state, input.attributes, numeric_state))
    } else {
        None
    };

    let occupancy = infer_occupancy(
        category,
        input.state,
        input.attributes,
        numeric_state,
        power_value,
    );

    Features {
        time: extract_time(input.last_changed),
        state_changed: state_changed(input.last_changed, input.last_updated),
        numeric_state,
        room: extract_room(input.entity_id, input.area_name),
        device_category: category,
        temperature_value,
        humidity_value,
        power_value,
        energy_value,
        hvac,
        occupancy,
    }
}

impl Features {
    /// Copy the feature bag onto a record
    pub fn apply_to(&self, record: &mut TimelineRecord) {
        record.hour_of_day = Some(self.time.hour_of_day);
        record.day_of_week = Some(self.time.day_of_week);
        record.month = Some(self.time.month);
        record.is_weekend = Some(self.time.is_weekend);
        record.is_night = Some(self.time.is_night);
        record.time_of_day = Some(self.time.time_of_day);
        record.season = Some(self.time.season);
        record.state_changed = Some(self.state_changed);
        record.hour_sin = Some(self.time.hour_sin);
        record.hour_cos = Some(self.time.hour_cos);
        record.day_sin = Some(self.time.day_sin);
        record.day_cos = Some(self.time.day_cos);

        record.state_numeric = self.numeric_state;
        record.room = self.room.clone();
        record.device_category = Some(self.device_category);
        record.temperature_value = self.temperature_value;
        record.humidity_value = self.humidity_value;
        record.power_value = self.power_value;
        record.energy_value = self.energy_value;

        if let Some(hvac) = &self.hvac {
            record.hvac_mode = hvac.hvac_mode.clone();
            record.hvac_action = hvac.hvac_action.clone();
            record.fan_mode = hvac.fan_mode.clone();
            record.target_temperature = hvac.target_temperature;
            record.current_temperature = hvac.current_temperature;
        }

        if let Some(occupancy) = &self.occupancy {
            record.occupancy_score = Some(occupancy.score);
            record.occupancy_confidence = Some(occupancy.confidence);
        }
    }
}
