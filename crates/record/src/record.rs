//! The unified timeline record
//!
//! One row of the destination table. Union-shaped: `record_type` selects
//! whether the state field group or the event field group is populated;
//! shared fields and derived features are always eligible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;

/// Discriminator between state-change rows and event rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// A state change from the source store's states table
    State,
    /// An event from the source store's events table
    Event,
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State => write!(f, "state"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// Device category derived from device class, domain, or entity id keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Temperature,
    Humidity,
    Power,
    Energy,
    AirQuality,
    Hvac,
    Motion,
    DoorWindow,
    Light,
    Other,
}

impl DeviceCategory {
    /// String form as stored in the destination table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Power => "power",
            Self::Energy => "energy",
            Self::AirQuality => "air_quality",
            Self::Hvac => "hvac",
            Self::Motion => "motion",
            Self::DoorWindow => "door_window",
            Self::Light => "light",
            Self::Other => "other",
        }
    }
}

/// Coarse time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    /// 21:00 - 05:59
    Night,
}

/// Northern-hemisphere season by month grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// Dec, Jan, Feb
    Winter,
    /// Mar, Apr, May
    Spring,
    /// Jun, Jul, Aug
    Summer,
    /// Sep, Oct, Nov
    Autumn,
}

/// Confidence of the occupancy inference, based on how many signals were present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyConfidence {
    High,
    Medium,
    Low,
}

/// One row of the destination timeline table
///
/// All optional fields serialize as absent when `None` so the JSON-Lines
/// staging format stays compact and the warehouse sees proper NULLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    /// Synthetic row id, not part of the dedup identity
    pub record_id: String,

    /// Canonical event time: `last_changed` for states, fire time for events
    pub timestamp: DateTime<Utc>,

    /// Row shape discriminator
    pub record_type: RecordType,

    /// Source entity id (always present; events without one are dropped upstream)
    pub entity_id: String,

    /// Domain prefix of the entity id (`sensor`, `climate`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    // ------------------------------------------------------------------
    // State field group
    // ------------------------------------------------------------------
    /// Raw state string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Sanitized attributes as JSON text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,

    /// When the state value last changed - half of the dedup identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_changed: Option<DateTime<Utc>>,

    /// When the row was last written (attribute-only updates move this alone)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,

    // ------------------------------------------------------------------
    // Event field group
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Raw event payload as JSON text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_data: Option<String>,

    /// Who or what fired the event (user id or payload source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,

    // ------------------------------------------------------------------
    // Linkage
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_user_id: Option<String>,

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,

    /// Resolved label display names, trimmed and non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    // ------------------------------------------------------------------
    // Time features
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_of_day: Option<u32>,

    /// Monday = 0 .. Sunday = 6
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_weekend: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_night: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,

    /// False when the row's timestamps coincide within tolerance
    /// (attribute-only update)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_changed: Option<bool>,

    // ------------------------------------------------------------------
    // Derived numeric features
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_numeric: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_category: Option<DeviceCategory>,

    // ------------------------------------------------------------------
    // HVAC features
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hvac_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hvac_action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temperature: Option<f64>,

    // ------------------------------------------------------------------
    // Cyclic encodings
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_sin: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_cos: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_sin: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_cos: Option<f64>,

    // ------------------------------------------------------------------
    // Rate-of-change placeholders - present in the schema, not populated
    // by the single-row transform (needs a lookback window)
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_delta: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_derivative: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_since_last_change: Option<f64>,

    // ------------------------------------------------------------------
    // Occupancy inference
    // ------------------------------------------------------------------
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupancy_confidence: Option<OccupancyConfidence>,

    /// Wall-clock time of the run that produced or last updated this row.
    /// NOT part of the dedup identity.
    pub export_timestamp: DateTime<Utc>,
}

impl TimelineRecord {
    /// Create an empty record with only the required fields populated
    pub fn new(
        record_type: RecordType,
        entity_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        export_timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            record_id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            record_type,
            entity_id: entity_id.into(),
            domain: None,
            state: None,
            attributes: None,
            last_changed: None,
            last_updated: None,
            event_type: None,
            event_data: None,
            triggered_by: None,
            context_id: None,
            context_user_id: None,
            friendly_name: None,
            unit_of_measurement: None,
            area_id: None,
            area_name: None,
            labels: Vec::new(),
            hour_of_day: None,
            day_of_week: None,
            month: None,
            is_weekend: None,
            is_night: None,
            time_of_day: None,
            season: None,
            state_changed: None,
            state_numeric: None,
            temperature_value: None,
            humidity_value: None,
            power_value: None,
            energy_value: None,
            room: None,
            device_category: None,
            hvac_mode: None,
            hvac_action: None,
            fan_mode: None,
            target_temperature: None,
            current_temperature: None,
            hour_sin: None,
            hour_cos: None,
            day_sin: None,
            day_cos: None,
            state_delta: None,
            state_derivative: None,
            time_since_last_change: None,
            occupancy_score: None,
            occupancy_confidence: None,
            export_timestamp,
        }
    }

    /// The dedup/merge identity of this row, when it has one
    ///
    /// Two exports covering overlapping ranges must converge to one row
    /// per key; rows without a `last_changed` cannot participate in the
    /// merge and are excluded from its source.
    pub fn merge_key(&self) -> Option<(&str, DateTime<Utc>)> {
        self.last_changed.map(|lc| (self.entity_id.as_str(), lc))
    }
}
