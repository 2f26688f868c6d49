//! Bulk Loader - Stage to disk, load in one job
//!
//! Above the bulk threshold, thousands of per-batch merge cycles lose to
//! a single load job. The loader stages every record to a JSON-Lines
//! file, loads it into one temp table, and runs one merge.
//!
//! The disk-space precondition runs before the first byte is written:
//! the staging filesystem must hold twice the estimated file size, or
//! the run fails fast with the estimate in the error. Staging file and
//! temp table are removed on every exit path; a cleanup failure is
//! logged without masking the original error.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use hearth_config::TableRef;
use hearth_record::TimelineRecord;
use hearth_warehouse::{
    BULK_TEMP_TABLE_PREFIX, MergeOutcome, StagingWriter, Warehouse, check_disk_space,
    temp_table_name,
};

use crate::error::{ExportError, Result};
use crate::status::{ExportPhase, ProgressReporter};

#[cfg(test)]
#[path = "bulk_test.rs"]
mod tests;

/// Loads one window's records through a staging file.
pub struct BulkLoader {
    warehouse: Arc<dyn Warehouse>,
    target: TableRef,
    staging_dir: PathBuf,
    reporter: ProgressReporter,
}

impl BulkLoader {
    pub fn new(
        warehouse: Arc<dyn Warehouse>,
        target: TableRef,
        staging_dir: PathBuf,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            warehouse,
            target,
            staging_dir,
            reporter,
        }
    }

    /// Stage `records`, load them into a temp table and merge into the
    /// main table. Returns the merge outcome and the record count.
    ///
    /// `estimated_rows` drives the disk-space precondition; it is the
    /// probed state row count, not the post-filter record count, which
    /// keeps the estimate conservative.
    pub fn load<I>(&self, records: I, estimated_rows: u64) -> Result<(MergeOutcome, u64)>
    where
        I: Iterator<Item = Result<TimelineRecord>>,
    {
        check_disk_space(&self.staging_dir, estimated_rows)?;

        self.reporter.phase(
            ExportPhase::Uploading,
            format!("staging ~{estimated_rows} rows"),
        );
        let mut writer = StagingWriter::create(Some(&self.staging_dir))?;
        for record in records {
            writer.write_record(&record?)?;
        }
        writer.finish()?;
        let written = writer.record_count();
        tracing::info!(
            records = written,
            path = %writer.path().display(),
            "staging file complete"
        );

        let name = temp_table_name(BULK_TEMP_TABLE_PREFIX, Utc::now());
        let temp = self.target.sibling(name).map_err(ExportError::from)?;

        self.warehouse.create_temp_table(&temp)?;
        let merged = (|| {
            let loaded = self.warehouse.load_staging_file(&temp, writer.path())?;
            tracing::info!(loaded, table = %temp, "load job complete");
            self.reporter
                .phase(ExportPhase::Merging, format!("merging {loaded} rows"));
            self.warehouse.run_merge(&self.target, &temp)
        })();
        if let Err(err) = self.warehouse.drop_table(&temp) {
            tracing::warn!(table = %temp, error = %err, "failed to drop temp table");
        }
        if let Err(err) = writer.cleanup() {
            tracing::warn!(error = %err, "failed to remove staging file");
        }

        let outcome = merged?;
        tracing::info!(
            inserted = outcome.inserted,
            updated = outcome.updated,
            "bulk merge complete"
        );
        Ok((outcome, written))
    }
}
