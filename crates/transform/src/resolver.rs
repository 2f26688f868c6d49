//! Metadata Resolver - Area and label enrichment from the entity registry
//!
//! Looks up where an entity lives and how it is labelled, so records carry
//! human-meaningful location metadata alongside the raw state.
//!
//! # Overview
//!
//! The registry is an optional dependency. When absent, resolution returns
//! empty metadata and the export proceeds without enrichment. When present,
//! resolution follows the fallback chain:
//!
//! 1. The entity's own area and labels win.
//! 2. If the entity has neither, its owning device is consulted.
//! 3. Label ids are translated to display names; unresolvable or blank
//!    names are silently dropped.
//!
//! Resolution never fails. A registry that cannot answer simply yields
//! less metadata.

use std::sync::Arc;

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

/// Registry view of a single entity.
#[derive(Debug, Clone, Default)]
pub struct RegistryEntry {
    pub area_id: Option<String>,
    pub area_name: Option<String>,
    pub device_id: Option<String>,
    /// Label ids, not display names.
    pub labels: Vec<String>,
}

/// Registry view of a device, used as fallback for entities without
/// their own area or labels.
#[derive(Debug, Clone, Default)]
pub struct DeviceEntry {
    pub area_id: Option<String>,
    pub area_name: Option<String>,
    /// Label ids, not display names.
    pub labels: Vec<String>,
}

/// Read-only access to the entity/device/label registries.
///
/// Implementations are expected to answer from an in-memory snapshot;
/// lookups happen once per exported row.
pub trait EntityRegistry: Send + Sync {
    /// The registry entry for `entity_id`, if registered.
    fn lookup_entity(&self, entity_id: &str) -> Option<RegistryEntry>;

    /// The device entry for `device_id`, if registered.
    fn lookup_device(&self, device_id: &str) -> Option<DeviceEntry>;

    /// The display name for a label id, if the label exists.
    fn label_name(&self, label_id: &str) -> Option<String>;
}

/// Resolved metadata attached to a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMetadata {
    pub area_id: Option<String>,
    pub area_name: Option<String>,
    /// Display names, trimmed and non-empty.
    pub labels: Vec<String>,
}

/// Resolves entity metadata through an optional registry.
#[derive(Clone, Default)]
pub struct MetadataResolver {
    registry: Option<Arc<dyn EntityRegistry>>,
}

impl MetadataResolver {
    pub fn new(registry: Option<Arc<dyn EntityRegistry>>) -> Self {
        Self { registry }
    }

    /// Resolves area and label metadata for `entity_id`.
    ///
    /// Falls back to the owning device when the entity itself carries no
    /// area or labels. Always succeeds; missing registry data yields
    /// empty metadata.
    pub fn resolve(&self, entity_id: &str) -> EntityMetadata {
        let Some(registry) = &self.registry else {
            return EntityMetadata::default();
        };
        let Some(entry) = registry.lookup_entity(entity_id) else {
            return EntityMetadata::default();
        };

        let device = match (&entry.area_id, entry.labels.is_empty(), &entry.device_id) {
            // Device lookup only pays off when something is missing.
            (None, _, Some(device_id)) | (_, true, Some(device_id)) => {
                registry.lookup_device(device_id)
            }
            _ => None,
        };

        let (area_id, area_name) = if entry.area_id.is_some() {
            (entry.area_id, entry.area_name)
        } else if let Some(device) = &device {
            (device.area_id.clone(), device.area_name.clone())
        } else {
            (None, None)
        };

        let label_ids = if entry.labels.is_empty() {
            device.map(|d| d.labels).unwrap_or_default()
        } else {
            entry.labels
        };

        let labels = label_ids
            .iter()
            .filter_map(|id| registry.label_name(id))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        EntityMetadata {
            area_id,
            area_name,
            labels,
        }
    }

    /// True when a registry is attached.
    pub fn has_registry(&self) -> bool {
        self.registry.is_some()
    }
}

impl std::fmt::Debug for MetadataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataResolver")
            .field("registry", &self.registry.is_some())
            .finish()
    }
}
