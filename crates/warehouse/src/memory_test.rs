use super::*;
use chrono::TimeZone;
use hearth_record::RecordType;

fn table(name: &str) -> TableRef {
    TableRef::new("my-project", "home", name).unwrap()
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
}

fn record(entity_id: &str, last_changed: DateTime<Utc>, last_updated: DateTime<Utc>) -> TimelineRecord {
    let mut record = TimelineRecord::new(RecordType::State, entity_id, last_changed, at(30, 0));
    record.last_changed = Some(last_changed);
    record.last_updated = Some(last_updated);
    record
}

fn setup(rows: Vec<TimelineRecord>) -> (MemoryWarehouse, TableRef, TableRef) {
    let warehouse = MemoryWarehouse::new();
    let main = table("timeline");
    let temp = table("temp_export_1");
    warehouse.ensure_table(&main).unwrap();
    warehouse.create_temp_table(&temp).unwrap();
    warehouse.insert_rows(&temp, &rows).unwrap();
    (warehouse, main, temp)
}

#[test]
fn merge_inserts_new_keys() {
    let rows = vec![
        record("sensor.a", at(1, 10), at(1, 10)),
        record("sensor.b", at(1, 11), at(1, 11)),
    ];
    let (warehouse, main, temp) = setup(rows);

    let outcome = warehouse.run_merge(&main, &temp).unwrap();
    assert_eq!(outcome, MergeOutcome { inserted: 2, updated: 0 });
    assert_eq!(warehouse.rows(&main).len(), 2);
}

#[test]
fn merge_collapses_duplicate_keys_keeping_latest_write() {
    let mut older = record("sensor.a", at(1, 10), at(1, 10));
    older.state = Some("old".into());
    let mut newer = record("sensor.a", at(1, 10), at(1, 12));
    newer.state = Some("new".into());

    let (warehouse, main, temp) = setup(vec![older, newer]);
    let outcome = warehouse.run_merge(&main, &temp).unwrap();

    assert_eq!(outcome.total(), 1);
    let rows = warehouse.rows(&main);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].state.as_deref(), Some("new"));
}

#[test]
fn merge_updates_matched_keys_in_place() {
    let mut first = record("sensor.a", at(1, 10), at(1, 10));
    first.state = Some("21.0".into());
    let (warehouse, main, temp) = setup(vec![first]);
    warehouse.run_merge(&main, &temp).unwrap();
    let original_id = warehouse.rows(&main)[0].record_id.clone();

    // Same key re-exported with refreshed mutable columns.
    let mut second = record("sensor.a", at(1, 10), at(1, 10));
    second.state = Some("21.5".into());
    let temp2 = table("temp_export_2");
    warehouse.create_temp_table(&temp2).unwrap();
    warehouse.insert_rows(&temp2, &[second]).unwrap();

    let outcome = warehouse.run_merge(&main, &temp2).unwrap();
    assert_eq!(outcome, MergeOutcome { inserted: 0, updated: 1 });

    let rows = warehouse.rows(&main);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].state.as_deref(), Some("21.5"));
    // Identity survives the update.
    assert_eq!(rows[0].record_id, original_id);
}

#[test]
fn merge_is_idempotent() {
    let rows = vec![
        record("sensor.a", at(1, 10), at(1, 10)),
        record("sensor.b", at(1, 11), at(1, 11)),
    ];
    let (warehouse, main, temp) = setup(rows.clone());
    warehouse.run_merge(&main, &temp).unwrap();

    let temp2 = table("temp_export_2");
    warehouse.create_temp_table(&temp2).unwrap();
    warehouse.insert_rows(&temp2, &rows).unwrap();
    let outcome = warehouse.run_merge(&main, &temp2).unwrap();

    assert_eq!(outcome, MergeOutcome { inserted: 0, updated: 2 });
    assert_eq!(warehouse.rows(&main).len(), 2);
}

#[test]
fn keyless_rows_are_excluded_from_the_merge() {
    let mut keyless = record("sensor.a", at(1, 10), at(1, 10));
    keyless.last_changed = None;
    let (warehouse, main, temp) = setup(vec![keyless]);

    let outcome = warehouse.run_merge(&main, &temp).unwrap();
    assert_eq!(outcome.total(), 0);
    assert!(warehouse.rows(&main).is_empty());
}

#[test]
fn load_staging_file_round_trips_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = crate::StagingWriter::create(Some(dir.path())).unwrap();
    writer.write_record(&record("sensor.a", at(1, 10), at(1, 10))).unwrap();
    writer.write_record(&record("sensor.b", at(1, 11), at(1, 11))).unwrap();
    writer.finish().unwrap();

    let warehouse = MemoryWarehouse::new();
    let temp = table("temp_bulk_export_1");
    warehouse.create_temp_table(&temp).unwrap();
    let loaded = warehouse.load_staging_file(&temp, writer.path()).unwrap();

    assert_eq!(loaded, 2);
    assert_eq!(warehouse.rows(&temp).len(), 2);
}

#[test]
fn drop_table_is_idempotent() {
    let warehouse = MemoryWarehouse::new();
    let temp = table("temp_export_1");
    warehouse.create_temp_table(&temp).unwrap();
    warehouse.drop_table(&temp).unwrap();
    warehouse.drop_table(&temp).unwrap();
    assert!(!warehouse.has_table(&temp));
}

#[test]
fn max_export_timestamp_reflects_the_latest_run() {
    let warehouse = MemoryWarehouse::new();
    let main = table("timeline");
    assert_eq!(warehouse.max_export_timestamp(&main).unwrap(), None);

    warehouse.ensure_table(&main).unwrap();
    assert_eq!(warehouse.max_export_timestamp(&main).unwrap(), None);

    let mut a = record("sensor.a", at(1, 10), at(1, 10));
    a.export_timestamp = at(2, 0);
    let mut b = record("sensor.b", at(1, 11), at(1, 11));
    b.export_timestamp = at(3, 0);
    warehouse.insert_rows(&main, &[a, b]).unwrap();

    assert_eq!(warehouse.max_export_timestamp(&main).unwrap(), Some(at(3, 0)));
}

#[test]
fn insert_into_missing_table_fails() {
    let warehouse = MemoryWarehouse::new();
    let err = warehouse
        .insert_rows(&table("nowhere"), &[record("sensor.a", at(1, 10), at(1, 10))])
        .unwrap_err();
    assert!(matches!(err, WarehouseError::Query(_)));
}

#[test]
fn injected_merge_failure_fires_once() {
    let (warehouse, main, temp) = setup(vec![record("sensor.a", at(1, 10), at(1, 10))]);
    warehouse.inject_merge_failure();
    assert!(warehouse.run_merge(&main, &temp).is_err());
    assert!(warehouse.run_merge(&main, &temp).is_ok());
}
