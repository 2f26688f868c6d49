use super::*;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use hearth_config::{ExportTuning, FilterConfig};
use hearth_record::{RecordType, TimelineRecord};
use hearth_transform::RecordBuilder;
use hearth_warehouse::MemoryWarehouse;

use crate::memory::MemoryStateStore;
use crate::store::StateStore;

fn at(day: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
}

#[test]
fn plan_covers_the_window_without_gaps_or_overlaps() {
    let window = ExportWindow::new(at(1), at(24));
    let chunks = plan_chunks(&window, 7);

    // 23 days at 7 per chunk: 4 chunks.
    assert_eq!(chunks.len(), 4);

    // Newest first; consecutive chunks abut exactly.
    assert_eq!(chunks[0].end, window.end);
    for pair in chunks.windows(2) {
        assert_eq!(pair[0].start, pair[1].end);
    }
    assert_eq!(chunks.last().unwrap().start, window.start);

    // Only the oldest chunk is short.
    assert_eq!(chunks[0].duration(), Duration::days(7));
    assert_eq!(chunks[3].duration(), Duration::days(2));
}

#[test]
fn plan_keeps_a_narrow_window_whole() {
    let window = ExportWindow::new(at(1), at(5));
    let chunks = plan_chunks(&window, 7);
    assert_eq!(chunks, vec![window]);
}

#[test]
fn plan_of_an_empty_window_is_empty() {
    let window = ExportWindow::new(at(5), at(5));
    assert!(plan_chunks(&window, 7).is_empty());
}

// ----------------------------------------------------------------------
// Scheduler behavior against in-memory collaborators
// ----------------------------------------------------------------------

struct Fixture {
    store: MemoryStateStore,
    warehouse: MemoryWarehouse,
    target: TableRef,
}

impl Fixture {
    fn new() -> Self {
        let warehouse = MemoryWarehouse::new();
        let target = TableRef::new("my-project", "home", "timeline").unwrap();
        warehouse.ensure_table(&target).unwrap();
        Self {
            store: MemoryStateStore::new(),
            warehouse,
            target,
        }
    }

    fn exporter(&self, export_timestamp: chrono::DateTime<Utc>) -> RangeExporter {
        let builder = RecordBuilder::new(&FilterConfig::default(), None, export_timestamp).unwrap();
        RangeExporter::new(
            Arc::new(self.store.clone()),
            Arc::new(self.warehouse.clone()),
            builder,
            self.target.clone(),
            ExportTuning::default(),
            ProgressReporter::disabled(),
        )
    }

    fn scheduler<'a>(&self, exporter: &'a RangeExporter) -> ChunkScheduler<'a> {
        ChunkScheduler::new(
            exporter,
            Arc::new(self.warehouse.clone()),
            self.target.clone(),
            7,
            std::time::Duration::ZERO,
            ProgressReporter::disabled(),
        )
    }

    fn push_state(&self, entity_id: &str, day: u32) {
        self.store.push_state(hearth_record::StateRow {
            entity_id: entity_id.into(),
            state: Some("21.0".into()),
            attributes: None,
            last_updated_ts: at(day).timestamp() as f64,
            last_changed_ts: None,
            last_reported_ts: None,
            context_id: None,
            context_user_id: None,
        });
    }
}

#[test]
fn chunked_export_accumulates_all_chunks() {
    let fixture = Fixture::new();
    for day in [2, 9, 16, 22] {
        fixture.push_state("sensor.a", day);
    }

    let exporter = fixture.exporter(at(30));
    let stats = fixture
        .scheduler(&exporter)
        .export_chunked(&ExportWindow::new(at(1), at(24)), false)
        .unwrap();

    assert_eq!(stats.state_rows, 4);
    assert_eq!(stats.inserted, 4);
    assert_eq!(fixture.warehouse.rows(&fixture.target).len(), 4);
}

#[test]
fn smart_noop_touches_the_store_zero_times() {
    let fixture = Fixture::new();
    fixture.push_state("sensor.a", 2);

    // A previous run already covered everything up to the window end.
    let mut marker = TimelineRecord::new(RecordType::State, "sensor.a", at(2), at(25));
    marker.last_changed = Some(at(2));
    fixture.warehouse.insert_rows(&fixture.target, &[marker]).unwrap();

    let exporter = fixture.exporter(at(30));
    let stats = fixture
        .scheduler(&exporter)
        .export_chunked(&ExportWindow::new(at(1), at(24)), true)
        .unwrap();

    assert_eq!(stats, ExportStats::default());
    assert_eq!(fixture.store.query_count(), 0);
}

#[test]
fn smart_mode_clamps_to_the_watermark() {
    let fixture = Fixture::new();
    fixture.push_state("sensor.old", 2);
    fixture.push_state("sensor.new", 20);

    // Watermark halfway through the window: only the newer row qualifies.
    let mut marker = TimelineRecord::new(RecordType::State, "sensor.old", at(2), at(10));
    marker.last_changed = Some(at(2));
    fixture.warehouse.insert_rows(&fixture.target, &[marker]).unwrap();

    let exporter = fixture.exporter(at(30));
    let stats = fixture
        .scheduler(&exporter)
        .export_chunked(&ExportWindow::new(at(1), at(24)), true)
        .unwrap();

    assert_eq!(stats.state_rows, 1);
}

#[test]
fn failing_chunk_aborts_with_its_position() {
    let fixture = Fixture::new();
    for day in [2, 9, 16, 22] {
        fixture.push_state("sensor.a", day);
    }
    fixture.warehouse.inject_merge_failure();

    let exporter = fixture.exporter(at(30));
    let err = fixture
        .scheduler(&exporter)
        .export_chunked(&ExportWindow::new(at(1), at(24)), false)
        .unwrap_err();

    match err {
        ExportError::ChunkFailed { index, total, .. } => {
            assert_eq!(index, 1);
            assert_eq!(total, 4);
        }
        other => panic!("expected ChunkFailed, got {other}"),
    }
}
