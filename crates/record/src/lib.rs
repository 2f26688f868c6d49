//! Hearth - Record
//!
//! Core data model shared by every stage of the export pipeline.
//!
//! # Overview
//!
//! The destination warehouse holds one wide "unified timeline" table. Each
//! row is a [`TimelineRecord`]: a state change or an event, enriched with
//! area/label metadata and derived ML features. The dedup identity of a row
//! is the `(entity_id, last_changed)` pair - never a synthetic primary key -
//! so re-exporting an overlapping time range converges instead of
//! duplicating.
//!
//! # Modules
//!
//! - `record` - `TimelineRecord` and its value vocabularies
//! - `row` - raw rows as read from the source store
//! - `schema` - destination table schema description

mod record;
mod row;
mod schema;

pub use record::{
    DeviceCategory, OccupancyConfidence, RecordType, Season, TimeOfDay, TimelineRecord,
};
pub use row::{EventRow, StateRow, datetime_from_epoch};
pub use schema::{
    CLUSTERING_FIELDS, FieldKind, PARTITION_FIELD, SchemaField, TABLE_SCHEMA,
    merge_update_columns,
};
