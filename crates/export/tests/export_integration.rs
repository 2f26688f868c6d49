//! End-to-end export tests
//!
//! These drive the orchestrator through in-process collaborators: a
//! memory state store, a memory warehouse with real merge semantics,
//! and a map-backed registry, with configuration parsed from TOML.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use hearth_config::{ExporterConfig, TableRef};
use hearth_export::{ExportOrchestrator, ExportPhase, ExportWindow, MemoryStateStore};
use hearth_record::{EventRow, RecordType, StateRow};
use hearth_transform::{DeviceEntry, EntityRegistry, RegistryEntry};
use hearth_warehouse::MemoryWarehouse;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

fn target() -> TableRef {
    TableRef::new("my-project", "home", "timeline").unwrap()
}

fn test_config(staging: &std::path::Path) -> ExporterConfig {
    let toml = format!(
        r#"
        [warehouse]
        project = "my-project"
        dataset = "home"
        table = "timeline"

        [filter]
        mode = "exclude"
        exclude_patterns = ["sensor.noisy_*"]

        [filter.denied_attributes]
        "device_tracker.*" = ["latitude", "longitude"]

        [export]
        cooldown_secs = 0
        inter_chunk_pause_ms = 0
        include_events = true
        staging_dir = "{}"
        "#,
        staging.display()
    );
    toml.parse().unwrap()
}

struct MapRegistry {
    entities: HashMap<String, RegistryEntry>,
    devices: HashMap<String, DeviceEntry>,
    labels: HashMap<String, String>,
}

impl MapRegistry {
    fn with_kitchen_sensor() -> Self {
        let mut entities = HashMap::new();
        entities.insert(
            "sensor.kitchen_temperature".to_string(),
            RegistryEntry {
                area_id: None,
                area_name: None,
                device_id: Some("dev_kitchen".to_string()),
                labels: Vec::new(),
            },
        );
        let mut devices = HashMap::new();
        devices.insert(
            "dev_kitchen".to_string(),
            DeviceEntry {
                area_id: Some("kitchen".to_string()),
                area_name: Some("Kitchen".to_string()),
                labels: vec!["lbl_climate".to_string()],
            },
        );
        let mut labels = HashMap::new();
        labels.insert("lbl_climate".to_string(), "Climate".to_string());
        Self {
            entities,
            devices,
            labels,
        }
    }
}

impl EntityRegistry for MapRegistry {
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

fn state(entity_id: &str, attributes: Option<&str>, day: u32, hour: u32) -> StateRow {
    StateRow {
        entity_id: entity_id.into(),
        state: Some("21.5".into()),
        attributes: attributes.map(str::to_string),
        last_updated_ts: at(day, hour).timestamp() as f64,
        last_changed_ts: None,
        last_reported_ts: None,
        context_id: Some("ctx".into()),
        context_user_id: None,
    }
}

#[tokio::test]
async fn full_pipeline_filters_redacts_and_enriches() {
    let staging = tempfile::tempdir().unwrap();
    let store = MemoryStateStore::new();
    let warehouse = MemoryWarehouse::new();

    store.push_state(state(
        "sensor.kitchen_temperature",
        Some(r#"{"friendly_name":"Kitchen Temp","device_class":"temperature"}"#),
        2,
        10,
    ));
    store.push_state(state(
        "device_tracker.phone",
        Some(r#"{"latitude":52.1,"longitude":4.3,"battery":50}"#),
        2,
        11,
    ));
    store.push_state(state("sensor.noisy_counter", None, 2, 12));
    store.push_event(EventRow {
        event_id: 1,
        event_type: "automation_triggered".into(),
        event_data: Some(r#"{"entity_id":"automation.morning","name":"Morning"}"#.into()),
        time_fired_ts: at(2, 13).timestamp() as f64,
        context_id: None,
        context_user_id: Some("user1".into()),
    });

    let (orchestrator, mut receiver) = ExportOrchestrator::new(
        test_config(staging.path()),
        Arc::new(store),
        Arc::new(warehouse.clone()),
        Some(Arc::new(MapRegistry::with_kitchen_sensor())),
    )
    .unwrap();

    let stats = orchestrator
        .export_window(ExportWindow::new(at(1, 0), at(5, 0)))
        .await
        .unwrap();

    // The noisy sensor was filtered; two states and one event landed.
    assert_eq!(stats.state_rows, 3);
    assert_eq!(stats.event_rows, 1);
    assert_eq!(stats.records, 3);
    assert_eq!(stats.inserted, 3);

    let rows = warehouse.rows(&target());
    assert_eq!(rows.len(), 3);
    assert!(!rows.iter().any(|r| r.entity_id == "sensor.noisy_counter"));

    // Registry metadata flowed through the device fallback.
    let kitchen = rows
        .iter()
        .find(|r| r.entity_id == "sensor.kitchen_temperature")
        .unwrap();
    assert_eq!(kitchen.area_name.as_deref(), Some("Kitchen"));
    assert_eq!(kitchen.labels, vec!["Climate".to_string()]);
    assert_eq!(kitchen.room.as_deref(), Some("Kitchen"));
    assert_eq!(kitchen.state_numeric, Some(21.5));

    // Redaction happened before serialization.
    let tracker = rows
        .iter()
        .find(|r| r.entity_id == "device_tracker.phone")
        .unwrap();
    let attributes = tracker.attributes.as_deref().unwrap();
    assert!(!attributes.contains("latitude"));
    assert!(attributes.contains("battery"));

    // The event interleaved into the same table.
    let event = rows
        .iter()
        .find(|r| r.record_type == RecordType::Event)
        .unwrap();
    assert_eq!(event.entity_id, "automation.morning");
    assert_eq!(event.triggered_by.as_deref(), Some("user1"));

    // The status stream closed out with a completion.
    let mut last = None;
    while let Ok(event) = receiver.try_recv() {
        last = Some(event);
    }
    assert_eq!(last.unwrap().phase, ExportPhase::Completed);
}

#[tokio::test]
async fn re_export_converges_instead_of_duplicating() {
    let staging = tempfile::tempdir().unwrap();
    let store = MemoryStateStore::new();
    let warehouse = MemoryWarehouse::new();
    store.push_state(state("sensor.kitchen_temperature", None, 2, 10));

    let (orchestrator, _receiver) = ExportOrchestrator::new(
        test_config(staging.path()),
        Arc::new(store),
        Arc::new(warehouse.clone()),
        None,
    )
    .unwrap();

    let window = ExportWindow::new(at(1, 0), at(5, 0));
    let first = orchestrator.export_window(window).await.unwrap();
    let second = orchestrator.export_window(window).await.unwrap();

    assert_eq!(first.inserted, 1);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 1);
    assert_eq!(warehouse.rows(&target()).len(), 1);
    // No temp tables or staging files linger.
    assert_eq!(warehouse.table_names(), vec![target().to_string()]);
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}
