use super::*;
use std::collections::HashMap;

#[derive(Default)]
struct FakeRegistry {
    entities: HashMap<String, RegistryEntry>,
    devices: HashMap<String, DeviceEntry>,
    labels: HashMap<String, String>,
}

impl EntityRegistry for FakeRegistry {
    fn lookup_entity(&self, entity_id: &str) -> Option<RegistryEntry> {
        self.entities.get(entity_id).cloned()
    }

    fn lookup_device(&self, device_id: &str) -> Option<DeviceEntry> {
        self.devices.get(device_id).cloned()
    }

    fn label_name(&self, label_id: &str) -> Option<String> {
        self.labels.get(label_id).cloned()
    }
}

fn resolver(registry: FakeRegistry) -> MetadataResolver {
    MetadataResolver::new(Some(Arc::new(registry)))
}

#[test]
fn no_registry_yields_empty_metadata() {
    let resolver = MetadataResolver::new(None);
    assert!(!resolver.has_registry());
    assert_eq!(resolver.resolve("sensor.kitchen"), EntityMetadata::default());
}

#[test]
fn unknown_entity_yields_empty_metadata() {
    let resolver = resolver(FakeRegistry::default());
    assert_eq!(resolver.resolve("sensor.kitchen"), EntityMetadata::default());
}

#[test]
fn entity_area_and_labels_win() {
    let mut registry = FakeRegistry::default();
    registry.entities.insert(
        "sensor.kitchen".into(),
        RegistryEntry {
            area_id: Some("kitchen".into()),
            area_name: Some("Kitchen".into()),
            device_id: Some("dev1".into()),
            labels: vec!["lbl1".into()],
        },
    );
    registry.devices.insert(
        "dev1".into(),
        DeviceEntry {
            area_id: Some("garage".into()),
            area_name: Some("Garage".into()),
            labels: vec!["lbl2".into()],
        },
    );
    registry.labels.insert("lbl1".into(), "Climate".into());
    registry.labels.insert("lbl2".into(), "Security".into());

    let metadata = resolver(registry).resolve("sensor.kitchen");
    assert_eq!(metadata.area_id.as_deref(), Some("kitchen"));
    assert_eq!(metadata.area_name.as_deref(), Some("Kitchen"));
    assert_eq!(metadata.labels, vec!["Climate".to_string()]);
}

#[test]
fn device_fills_in_missing_area_and_labels() {
    let mut registry = FakeRegistry::default();
    registry.entities.insert(
        "sensor.garage_door".into(),
        RegistryEntry {
            device_id: Some("dev1".into()),
            ..Default::default()
        },
    );
    registry.devices.insert(
        "dev1".into(),
        DeviceEntry {
            area_id: Some("garage".into()),
            area_name: Some("Garage".into()),
            labels: vec!["lbl2".into()],
        },
    );
    registry.labels.insert("lbl2".into(), "Security".into());

    let metadata = resolver(registry).resolve("sensor.garage_door");
    assert_eq!(metadata.area_id.as_deref(), Some("garage"));
    assert_eq!(metadata.area_name.as_deref(), Some("Garage"));
    assert_eq!(metadata.labels, vec!["Security".to_string()]);
}

#[test]
fn label_names_are_trimmed_and_blank_ones_dropped() {
    let mut registry = FakeRegistry::default();
    registry.entities.insert(
        "sensor.x".into(),
        RegistryEntry {
            labels: vec!["a".into(), "b".into(), "c".into(), "missing".into()],
            ..Default::default()
        },
    );
    registry.labels.insert("a".into(), "  Upstairs  ".into());
    registry.labels.insert("b".into(), "   ".into());
    registry.labels.insert("c".into(), "Energy".into());

    let metadata = resolver(registry).resolve("sensor.x");
    assert_eq!(
        metadata.labels,
        vec!["Upstairs".to_string(), "Energy".to_string()]
    );
}

#[test]
fn dangling_device_reference_degrades_to_empty() {
    let mut registry = FakeRegistry::default();
    registry.entities.insert(
        "sensor.x".into(),
        RegistryEntry {
            device_id: Some("gone".into()),
            ..Default::default()
        },
    );

    let metadata = resolver(registry).resolve("sensor.x");
    assert_eq!(metadata, EntityMetadata::default());
}
