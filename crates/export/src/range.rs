//! Range Exporter - One window, end to end
//!
//! Exports every qualifying row of one time window into the warehouse.
//!
//! # Strategy
//!
//! 1. Probe the state row count for the window. Zero rows is a no-op.
//! 2. Above the bulk threshold (and with the bulk path enabled), the
//!    whole window is staged to a file and loaded as one job.
//! 3. Otherwise rows stream through fixed-size batches, each flushed
//!    through its own temp-table merge cycle. Partial progress from
//!    flushed batches survives a later failure; the merge key makes the
//!    retry converge.
//!
//! With event export on, event rows feed the same batching stream after
//! the states, so both row kinds land through identical merge cycles.

use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use hearth_config::{ExportTuning, TableRef};
use hearth_record::{EventRow, TimelineRecord};
use hearth_transform::RecordBuilder;
use hearth_warehouse::{TEMP_TABLE_PREFIX, Warehouse, temp_table_name};

use crate::bulk::BulkLoader;
use crate::error::{ExportError, Result};
use crate::status::{ExportPhase, ProgressReporter};
use crate::store::{RowIter, StateStore};
use crate::window::ExportWindow;

#[cfg(test)]
#[path = "range_test.rs"]
mod tests;

/// What one export run (or chunk) did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// State rows read from the store
    pub state_rows: u64,
    /// Event rows read from the store
    pub event_rows: u64,
    /// Records produced after filtering and transformation
    pub records: u64,
    /// Rows the merges inserted as new keys
    pub inserted: u64,
    /// Rows the merges updated in place
    pub updated: u64,
}

impl ExportStats {
    /// Fold another run's stats into this one.
    pub fn absorb(&mut self, other: &ExportStats) {
        self.state_rows += other.state_rows;
        self.event_rows += other.event_rows;
        self.records += other.records;
        self.inserted += other.inserted;
        self.updated += other.updated;
    }
}

/// Exports single windows. One instance serves a whole run, so the
/// record builder's `export_timestamp` is shared across chunks.
pub struct RangeExporter {
    store: Arc<dyn StateStore>,
    warehouse: Arc<dyn Warehouse>,
    builder: RecordBuilder,
    target: TableRef,
    tuning: ExportTuning,
    reporter: ProgressReporter,
    /// Disambiguates temp tables created within the same second
    batch_seq: AtomicU64,
}

impl RangeExporter {
    pub fn new(
        store: Arc<dyn StateStore>,
        warehouse: Arc<dyn Warehouse>,
        builder: RecordBuilder,
        target: TableRef,
        tuning: ExportTuning,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            store,
            warehouse,
            builder,
            target,
            tuning,
            reporter,
            batch_seq: AtomicU64::new(0),
        }
    }

    /// Export one window. Blocking; run from a worker thread.
    pub fn export(&self, window: &ExportWindow) -> Result<ExportStats> {
        let count = self.store.count_states(window)?;
        if count == 0 {
            tracing::info!(window = %window, "no rows in window, nothing to export");
            self.reporter
                .phase(ExportPhase::Planning, format!("no rows in {window}"));
            return Ok(ExportStats::default());
        }

        tracing::info!(window = %window, rows = count, "exporting window");
        if self.tuning.bulk_enabled && count > self.tuning.bulk_threshold {
            self.export_bulk(window, count)
        } else {
            self.export_direct(window, count)
        }
    }

    // ------------------------------------------------------------------
    // Direct path: batched temp-table merge cycles
    // ------------------------------------------------------------------

    fn export_direct(&self, window: &ExportWindow, count: u64) -> Result<ExportStats> {
        self.reporter.phase(
            ExportPhase::Exporting,
            format!("direct export of {count} rows"),
        );

        let mut stats = ExportStats::default();
        let mut batch: Vec<TimelineRecord> = Vec::with_capacity(self.tuning.batch_size);

        for row in self.store.state_rows(window)? {
            let row = row?;
            stats.state_rows += 1;
            if let Some(record) = self.builder.from_state(&row) {
                self.push(record, &mut batch, &mut stats)?;
            }
        }

        if self.tuning.include_events {
            for row in self.store.event_rows(window, &self.tuning.event_types)? {
                let row = row?;
                stats.event_rows += 1;
                if let Some(record) = self.builder.from_event(&row) {
                    self.push(record, &mut batch, &mut stats)?;
                }
            }
        }

        self.flush_batch(&mut batch, &mut stats)?;
        Ok(stats)
    }

    fn push(
        &self,
        record: TimelineRecord,
        batch: &mut Vec<TimelineRecord>,
        stats: &mut ExportStats,
    ) -> Result<()> {
        batch.push(record);
        stats.records += 1;
        self.reporter.add_records(1);
        if batch.len() >= self.tuning.batch_size {
            self.flush_batch(batch, stats)?;
        }
        Ok(())
    }

    /// One merge cycle: temp table, insert, merge, drop. The drop runs
    /// on both the success and the failure path.
    fn flush_batch(&self, batch: &mut Vec<TimelineRecord>, stats: &mut ExportStats) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let seq = self.batch_seq.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}_{seq}", temp_table_name(TEMP_TABLE_PREFIX, Utc::now()));
        let temp = self.target.sibling(name).map_err(ExportError::from)?;

        self.warehouse.create_temp_table(&temp)?;
        let merged = (|| {
            self.warehouse.insert_rows(&temp, batch)?;
            self.warehouse.run_merge(&self.target, &temp)
        })();
        if let Err(err) = self.warehouse.drop_table(&temp) {
            tracing::warn!(table = %temp, error = %err, "failed to drop temp table");
        }

        let outcome = merged?;
        tracing::debug!(
            rows = batch.len(),
            inserted = outcome.inserted,
            updated = outcome.updated,
            "flushed batch"
        );
        stats.inserted += outcome.inserted;
        stats.updated += outcome.updated;
        batch.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bulk path: stage everything, load once
    // ------------------------------------------------------------------

    fn export_bulk(&self, window: &ExportWindow, count: u64) -> Result<ExportStats> {
        let loader = BulkLoader::new(
            Arc::clone(&self.warehouse),
            self.target.clone(),
            self.tuning.staging_dir.clone(),
            self.reporter.clone(),
        );

        let state_rows = Cell::new(0u64);
        let event_rows = Cell::new(0u64);

        let states = self.store.state_rows(window)?;
        let state_records = states.filter_map(|row| match row {
            Ok(row) => {
                state_rows.set(state_rows.get() + 1);
                self.builder.from_state(&row).map(Ok)
            }
            Err(err) => Some(Err(ExportError::from(err))),
        });

        let events: RowIter<'_, EventRow> = if self.tuning.include_events {
            self.store.event_rows(window, &self.tuning.event_types)?
        } else {
            Box::new(std::iter::empty())
        };
        let event_records = events.filter_map(|row| match row {
            Ok(row) => {
                event_rows.set(event_rows.get() + 1);
                self.builder.from_event(&row).map(Ok)
            }
            Err(err) => Some(Err(ExportError::from(err))),
        });

        let reporter = self.reporter.clone();
        let counted = state_records.chain(event_records).inspect(|record| {
            if record.is_ok() {
                reporter.add_records(1);
            }
        });

        let (outcome, written) = loader.load(counted, count)?;
        Ok(ExportStats {
            state_rows: state_rows.get(),
            event_rows: event_rows.get(),
            records: written,
            inserted: outcome.inserted,
            updated: outcome.updated,
        })
    }
}
