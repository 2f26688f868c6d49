//! Hearth - Warehouse
//!
//! The destination side of an export: table lifecycle, row delivery and
//! the merge that makes re-exports idempotent.
//!
//! # Overview
//!
//! The exporter never talks to a warehouse client directly; it drives the
//! [`Warehouse`] trait. A production implementation forwards each call to
//! the vendor API. [`MemoryWarehouse`] implements the same contract over
//! in-process tables, including the merge semantics, and backs the test
//! suites.
//!
//! Every merge cycle follows the same shape regardless of transport:
//!
//! ```text
//! create_temp_table → (insert_rows | load_staging_file) → run_merge → drop_table
//! ```
//!
//! # Modules
//!
//! - [`sql`]: MERGE statement construction and temp table naming
//! - [`staging`]: JSON-Lines staging files for bulk loads
//! - [`disk`]: free-space precondition for staging
//! - [`memory`]: in-process reference implementation

pub mod disk;
pub mod error;
pub mod memory;
pub mod sql;
pub mod staging;

use std::path::Path;

use chrono::{DateTime, Utc};
use hearth_config::TableRef;
use hearth_record::TimelineRecord;

pub use disk::{available_bytes, check_disk_space, required_bytes};
pub use error::{Result, WarehouseError};
pub use memory::MemoryWarehouse;
pub use sql::{BULK_TEMP_TABLE_PREFIX, TEMP_TABLE_PREFIX, merge_statement, temp_table_name};
pub use staging::StagingWriter;

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

/// What a merge did to the target table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Keys that did not exist in the target and were inserted
    pub inserted: u64,
    /// Keys that existed and had their mutable columns refreshed
    pub updated: u64,
}

impl MergeOutcome {
    /// Rows the merge touched in total
    pub fn total(&self) -> u64 {
        self.inserted + self.updated
    }
}

/// Destination warehouse operations, one call per pipeline step.
///
/// Implementations are called from a blocking export thread and may block
/// freely. All methods take `&self`; implementations carry their own
/// synchronization.
pub trait Warehouse: Send + Sync {
    /// Create the main timeline table if it does not exist, with the
    /// partitioning and clustering from [`hearth_record::TABLE_SCHEMA`].
    fn ensure_table(&self, table: &TableRef) -> Result<()>;

    /// Create an empty temp table with the timeline schema.
    fn create_temp_table(&self, table: &TableRef) -> Result<()>;

    /// Append rows to `table`. Returns the number of rows accepted.
    fn insert_rows(&self, table: &TableRef, rows: &[TimelineRecord]) -> Result<usize>;

    /// Load a JSON-Lines staging file into `table` as one job.
    /// Returns the number of rows loaded.
    fn load_staging_file(&self, table: &TableRef, path: &Path) -> Result<u64>;

    /// Merge `source` into `target` per the statement built by
    /// [`sql::merge_statement`].
    fn run_merge(&self, target: &TableRef, source: &TableRef) -> Result<MergeOutcome>;

    /// Drop `table`. Dropping a table that is already gone is not an error.
    fn drop_table(&self, table: &TableRef) -> Result<()>;

    /// Latest `export_timestamp` present in `table`, or `None` for an
    /// empty or missing table. Drives the incremental watermark.
    fn max_export_timestamp(&self, table: &TableRef) -> Result<Option<DateTime<Utc>>>;
}
