//! Record Builder - Raw rows to timeline records
//!
//! Assembles the per-run transformation pipeline and applies it to raw
//! store rows. One builder is constructed per export run so every record
//! it produces carries the same `export_timestamp`.
//!
//! # Overview
//!
//! For state rows:
//!
//! 1. Entity filter decides whether the row is exported at all.
//! 2. Attribute JSON is parsed; malformed JSON is logged and degraded to
//!    an empty map rather than dropping the row.
//! 3. Denied attributes are removed.
//! 4. Registry metadata and derived features are attached.
//!
//! Event rows follow the same path once an entity id has been recovered
//! from the payload. Events without a resolvable entity id are dropped;
//! they could never participate in the per-entity merge identity.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hearth_config::{ConfigError, FilterConfig};
use hearth_features::{FeatureInput, extract};
use hearth_record::{EventRow, RecordType, StateRow, TimelineRecord};
use serde_json::{Map, Value};

use crate::filter::EntityFilter;
use crate::resolver::{EntityRegistry, MetadataResolver};
use crate::sanitize::AttributeSanitizer;

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;

/// Builds [`TimelineRecord`]s from raw store rows for one export run.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    filter: EntityFilter,
    sanitizer: AttributeSanitizer,
    resolver: MetadataResolver,
    export_timestamp: DateTime<Utc>,
}

impl RecordBuilder {
    /// Compiles filter and sanitizer rules from `config`.
    ///
    /// `export_timestamp` is stamped onto every record this builder
    /// produces; callers freeze it once per run.
    pub fn new(
        config: &FilterConfig,
        registry: Option<Arc<dyn EntityRegistry>>,
        export_timestamp: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            filter: EntityFilter::new(config)?,
            sanitizer: AttributeSanitizer::new(config)?,
            resolver: MetadataResolver::new(registry),
            export_timestamp,
        })
    }

    /// The run timestamp stamped onto produced records.
    pub fn export_timestamp(&self) -> DateTime<Utc> {
        self.export_timestamp
    }

    /// Transforms one state row, or `None` when the row is filtered out
    /// or carries an unrepresentable timestamp.
    pub fn from_state(&self, row: &StateRow) -> Option<TimelineRecord> {
        if !self.filter.should_export(&row.entity_id) {
            return None;
        }

        let Some(last_updated) = row.last_updated() else {
            tracing::warn!(
                entity_id = %row.entity_id,
                ts = row.last_updated_ts,
                "skipping state row with unrepresentable timestamp"
            );
            return None;
        };
        // last_changed falls back to last_updated, so it cannot be None here
        let last_changed = row.last_changed()?;

        let mut attributes = parse_attributes(&row.entity_id, row.attributes.as_deref());
        self.sanitizer.sanitize(&row.entity_id, &mut attributes);

        let metadata = self.resolver.resolve(&row.entity_id);

        let features = extract(&FeatureInput {
            entity_id: &row.entity_id,
            domain: row.domain(),
            state: row.state.as_deref(),
            attributes: &attributes,
            area_name: metadata.area_name.as_deref(),
            last_changed,
            last_updated,
        });

        let mut record = TimelineRecord::new(
            RecordType::State,
            row.entity_id.clone(),
            last_changed,
            self.export_timestamp,
        );
        record.domain = row.domain().map(str::to_string);
        record.state = row.state.clone();
        record.last_changed = Some(last_changed);
        record.last_updated = Some(last_updated);
        record.context_id = row.context_id.clone();
        record.context_user_id = row.context_user_id.clone();

        record.friendly_name = attr_str(&attributes, "friendly_name")
            .map(str::to_string)
            .or_else(|| Some(row.entity_id.clone()));
        record.unit_of_measurement =
            attr_str(&attributes, "unit_of_measurement").map(str::to_string);
        if !attributes.is_empty() {
            record.attributes = serde_json::to_string(&attributes).ok();
        }

        record.area_id = metadata.area_id;
        record.area_name = metadata.area_name;
        record.labels = metadata.labels;

        features.apply_to(&mut record);
        Some(record)
    }

    /// Transforms one event row, or `None` when no entity id could be
    /// recovered from the payload or the entity is filtered out.
    pub fn from_event(&self, row: &EventRow) -> Option<TimelineRecord> {
        let payload = parse_event_data(row);

        let Some(entity_id) = event_entity_id(&row.event_type, &payload) else {
            tracing::debug!(
                event_type = %row.event_type,
                event_id = row.event_id,
                "dropping event without resolvable entity id"
            );
            return None;
        };
        if !self.filter.should_export(&entity_id) {
            return None;
        }

        let Some(time_fired) = row.time_fired() else {
            tracing::warn!(
                event_type = %row.event_type,
                event_id = row.event_id,
                ts = row.time_fired_ts,
                "skipping event row with unrepresentable timestamp"
            );
            return None;
        };

        let metadata = self.resolver.resolve(&entity_id);
        let domain = entity_id.split_once('.').map(|(d, _)| d.to_string());

        // Events have no attribute payload of their own; calendar and
        // identity-derived features still apply.
        let empty = Map::new();
        let features = extract(&FeatureInput {
            entity_id: &entity_id,
            domain: domain.as_deref(),
            state: None,
            attributes: &empty,
            area_name: metadata.area_name.as_deref(),
            last_changed: time_fired,
            last_updated: time_fired,
        });

        let mut record = TimelineRecord::new(
            RecordType::Event,
            entity_id,
            time_fired,
            self.export_timestamp,
        );
        record.domain = domain;
        // Fire time doubles as the merge identity so re-exported events
        // converge instead of duplicating.
        record.last_changed = Some(time_fired);
        record.last_updated = Some(time_fired);
        record.event_type = Some(row.event_type.clone());
        record.event_data = row.event_data.clone();
        record.triggered_by = row
            .context_user_id
            .clone()
            .or_else(|| payload.get("source").and_then(Value::as_str).map(str::to_string));
        record.context_id = row.context_id.clone();
        record.context_user_id = row.context_user_id.clone();

        record.area_id = metadata.area_id;
        record.area_name = metadata.area_name;
        record.labels = metadata.labels;

        features.apply_to(&mut record);
        Some(record)
    }
}

/// Parse attribute JSON, degrading to an empty map on malformed input.
fn parse_attributes(entity_id: &str, raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!(entity_id = %entity_id, "attribute payload is not a JSON object");
            Map::new()
        }
        Err(err) => {
            tracing::warn!(entity_id = %entity_id, error = %err, "malformed attribute JSON");
            Map::new()
        }
    }
}

fn parse_event_data(row: &EventRow) -> Map<String, Value> {
    let Some(raw) = row.event_data.as_deref() else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(err) => {
            tracing::warn!(
                event_type = %row.event_type,
                event_id = row.event_id,
                error = %err,
                "malformed event payload JSON"
            );
            Map::new()
        }
    }
}

fn attr_str<'a>(attributes: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    attributes.get(key).and_then(Value::as_str)
}

/// Recover the subject entity id from an event payload.
///
/// Payload shapes differ per event type: service calls bury the target
/// under `service_data` (as a string or a list), automation and script
/// events carry a top-level `entity_id`. A top-level `entity_id` always
/// wins when present.
fn event_entity_id(event_type: &str, payload: &Map<String, Value>) -> Option<String> {
    if let Some(id) = payload.get("entity_id").and_then(Value::as_str) {
        return Some(id.to_string());
    }

    if event_type == "call_service"
        && let Some(service_data) = payload.get("service_data").and_then(Value::as_object)
        && let Some(target) = service_data.get("entity_id")
    {
        return match target {
            Value::String(id) => Some(id.clone()),
            Value::Array(ids) => ids.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        };
    }

    None
}
