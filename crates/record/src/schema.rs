//! Destination table schema description
//!
//! The warehouse collaborator consumes this to ensure the main table exists.
//! The pipeline never creates destination schema from untrusted data; this
//! static description is the only source of truth.

/// Warehouse column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Float,
    Integer,
    Boolean,
    Timestamp,
    /// Repeated string column
    StringArray,
}

/// One column of the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

const fn req(name: &'static str, kind: FieldKind) -> SchemaField {
    SchemaField {
        name,
        kind,
        required: true,
    }
}

const fn opt(name: &'static str, kind: FieldKind) -> SchemaField {
    SchemaField {
        name,
        kind,
        required: false,
    }
}

/// Column the table is time-partitioned on
pub const PARTITION_FIELD: &str = "timestamp";

/// Clustering columns, in order
pub const CLUSTERING_FIELDS: &[&str] = &["record_type", "domain", "entity_id"];

/// Full unified-timeline table schema, in column order
pub const TABLE_SCHEMA: &[SchemaField] = &[
    // Identity
    req("record_id", FieldKind::String),
    req("timestamp", FieldKind::Timestamp),
    req("record_type", FieldKind::String),
    // Entity
    req("entity_id", FieldKind::String),
    opt("domain", FieldKind::String),
    // State fields
    opt("state", FieldKind::String),
    opt("attributes", FieldKind::String),
    opt("last_changed", FieldKind::Timestamp),
    opt("last_updated", FieldKind::Timestamp),
    // Event fields
    opt("event_type", FieldKind::String),
    opt("event_data", FieldKind::String),
    opt("triggered_by", FieldKind::String),
    // Linkage
    opt("context_id", FieldKind::String),
    opt("context_user_id", FieldKind::String),
    // Metadata
    opt("friendly_name", FieldKind::String),
    opt("unit_of_measurement", FieldKind::String),
    opt("area_id", FieldKind::String),
    opt("area_name", FieldKind::String),
    opt("labels", FieldKind::StringArray),
    // Time features
    opt("hour_of_day", FieldKind::Integer),
    opt("day_of_week", FieldKind::Integer),
    opt("month", FieldKind::Integer),
    opt("is_weekend", FieldKind::Boolean),
    opt("is_night", FieldKind::Boolean),
    opt("time_of_day", FieldKind::String),
    opt("season", FieldKind::String),
    opt("state_changed", FieldKind::Boolean),
    // Derived numeric features
    opt("state_numeric", FieldKind::Float),
    opt("temperature_value", FieldKind::Float),
    opt("humidity_value", FieldKind::Float),
    opt("power_value", FieldKind::Float),
    opt("energy_value", FieldKind::Float),
    opt("room", FieldKind::String),
    opt("device_category", FieldKind::String),
    // HVAC
    opt("hvac_mode", FieldKind::String),
    opt("hvac_action", FieldKind::String),
    opt("fan_mode", FieldKind::String),
    opt("target_temperature", FieldKind::Float),
    opt("current_temperature", FieldKind::Float),
    // Cyclic encodings
    opt("hour_sin", FieldKind::Float),
    opt("hour_cos", FieldKind::Float),
    opt("day_sin", FieldKind::Float),
    opt("day_cos", FieldKind::Float),
    // Rate-of-change placeholders (schema only, not populated)
    opt("state_delta", FieldKind::Float),
    opt("state_derivative", FieldKind::Float),
    opt("time_since_last_change", FieldKind::Float),
    // Occupancy inference
    opt("occupancy_score", FieldKind::Float),
    opt("occupancy_confidence", FieldKind::String),
    // Provenance
    req("export_timestamp", FieldKind::Timestamp),
];

/// Columns updated in place when a MERGE matches an existing key
///
/// Everything mutable or derived; the identity columns and `record_id`
/// stay as originally inserted.
pub fn merge_update_columns() -> Vec<&'static str> {
    TABLE_SCHEMA
        .iter()
        .map(|f| f.name)
        .filter(|name| {
            !matches!(
                *name,
                "record_id" | "entity_id" | "last_changed" | "timestamp" | "record_type"
            )
        })
        .collect()
}
