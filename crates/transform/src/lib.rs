//! Hearth - Transform
//!
//! Row-level transformation stage between the state store and the warehouse.
//!
//! # Overview
//!
//! Raw store rows pass through three steps before they become warehouse
//! records:
//!
//! ```text
//! [StateRow / EventRow] → [EntityFilter] → [AttributeSanitizer] → [RecordBuilder] → [TimelineRecord]
//! ```
//!
//! - **Filter**: decide per entity whether the row is exported at all.
//! - **Sanitize**: strip denied attributes before they leave the machine.
//! - **Build**: assemble the flattened [`TimelineRecord`] with derived
//!   features and registry metadata attached.
//!
//! All steps are infallible at row granularity. A malformed row degrades
//! (empty attributes, missing metadata) or is dropped with a log line; it
//! never aborts the surrounding export.
//!
//! # Modules
//!
//! - [`filter`]: glob-based include/exclude entity filtering
//! - [`sanitize`]: per-entity attribute redaction
//! - [`resolver`]: registry lookups for area and label metadata
//! - [`builder`]: row to record assembly
//!
//! [`TimelineRecord`]: hearth_record::TimelineRecord

pub mod builder;
pub mod filter;
pub mod resolver;
pub mod sanitize;

pub use builder::RecordBuilder;
pub use filter::EntityFilter;
pub use resolver::{DeviceEntry, EntityMetadata, EntityRegistry, MetadataResolver, RegistryEntry};
pub use sanitize::AttributeSanitizer;
