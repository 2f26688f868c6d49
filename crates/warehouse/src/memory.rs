//! In-process warehouse
//!
//! A complete [`Warehouse`] implementation over in-memory tables. The
//! merge follows the same dedup and update rules as the SQL statement in
//! [`crate::sql`], so exporter tests exercise the real idempotence
//! contract without a live warehouse.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use hearth_config::TableRef;
use hearth_record::TimelineRecord;
use parking_lot::Mutex;

use crate::error::{Result, WarehouseError};
use crate::{MergeOutcome, Warehouse};

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

#[derive(Default)]
struct Inner {
    tables: HashMap<String, Vec<TimelineRecord>>,
}

/// Shared in-memory warehouse. Clones see the same tables.
#[derive(Clone, Default)]
pub struct MemoryWarehouse {
    inner: Arc<Mutex<Inner>>,
    fail_next_merge: Arc<AtomicBool>,
}

impl MemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `run_merge` call fail, for error-path tests.
    pub fn inject_merge_failure(&self) {
        self.fail_next_merge.store(true, Ordering::SeqCst);
    }

    /// Snapshot of a table's rows; empty when the table does not exist.
    pub fn rows(&self, table: &TableRef) -> Vec<TimelineRecord> {
        self.inner
            .lock()
            .tables
            .get(&table.to_string())
            .cloned()
            .unwrap_or_default()
    }

    /// Names of all live tables, sorted. Leftover temp tables after an
    /// export are a cleanup bug.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.lock().tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_table(&self, table: &TableRef) -> bool {
        self.inner.lock().tables.contains_key(&table.to_string())
    }
}

impl Warehouse for MemoryWarehouse {
    fn ensure_table(&self, table: &TableRef) -> Result<()> {
        table.validate()?;
        self.inner
            .lock()
            .tables
            .entry(table.to_string())
            .or_default();
        Ok(())
    }

    fn create_temp_table(&self, table: &TableRef) -> Result<()> {
        table.validate()?;
        self.inner
            .lock()
            .tables
            .insert(table.to_string(), Vec::new());
        Ok(())
    }

    fn insert_rows(&self, table: &TableRef, rows: &[TimelineRecord]) -> Result<usize> {
        let mut inner = self.inner.lock();
        let Some(stored) = inner.tables.get_mut(&table.to_string()) else {
            return Err(WarehouseError::query(format!("no such table '{table}'")));
        };
        stored.extend_from_slice(rows);
        Ok(rows.len())
    }

    fn load_staging_file(&self, table: &TableRef, path: &Path) -> Result<u64> {
        let file = std::fs::File::open(path)?;
        let mut rows = Vec::new();
        for line in std::io::BufReader::new(file).lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let record: TimelineRecord = serde_json::from_str(&line)
                .map_err(|err| WarehouseError::load(path, err.to_string()))?;
            rows.push(record);
        }
        let loaded = rows.len() as u64;
        self.insert_rows(table, &rows)?;
        Ok(loaded)
    }

    fn run_merge(&self, target: &TableRef, source: &TableRef) -> Result<MergeOutcome> {
        if self.fail_next_merge.swap(false, Ordering::SeqCst) {
            return Err(WarehouseError::query("injected merge failure"));
        }
        // Statement construction performs the identifier re-validation a
        // real client would rely on.
        let _ = crate::sql::merge_statement(target, source)?;

        let mut inner = self.inner.lock();
        let source_rows = inner
            .tables
            .get(&source.to_string())
            .cloned()
            .ok_or_else(|| WarehouseError::query(format!("no such table '{source}'")))?;

        // Dedup per key, latest last_updated wins. Keyless rows are
        // excluded, as the statement's WHERE clause does.
        let mut deduped: HashMap<(String, DateTime<Utc>), TimelineRecord> = HashMap::new();
        for row in source_rows {
            let Some((entity_id, last_changed)) = row.merge_key() else {
                continue;
            };
            let key = (entity_id.to_string(), last_changed);
            match deduped.get(&key) {
                Some(existing) if existing.last_updated >= row.last_updated => {}
                _ => {
                    deduped.insert(key, row);
                }
            }
        }

        let Some(target_rows) = inner.tables.get_mut(&target.to_string()) else {
            return Err(WarehouseError::query(format!("no such table '{target}'")));
        };

        let mut outcome = MergeOutcome::default();
        for (key, row) in deduped {
            let existing = target_rows.iter_mut().find(|candidate| {
                candidate
                    .merge_key()
                    .is_some_and(|(id, lc)| (id, lc) == (key.0.as_str(), key.1))
            });
            match existing {
                Some(current) => {
                    // Identity columns survive the update, everything
                    // mutable is refreshed from the source row.
                    let mut updated = row;
                    updated.record_id = current.record_id.clone();
                    updated.timestamp = current.timestamp;
                    updated.record_type = current.record_type;
                    *current = updated;
                    outcome.updated += 1;
                }
                None => {
                    target_rows.push(row);
                    outcome.inserted += 1;
                }
            }
        }
        Ok(outcome)
    }

    fn drop_table(&self, table: &TableRef) -> Result<()> {
        self.inner.lock().tables.remove(&table.to_string());
        Ok(())
    }

    fn max_export_timestamp(&self, table: &TableRef) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .inner
            .lock()
            .tables
            .get(&table.to_string())
            .and_then(|rows| rows.iter().map(|r| r.export_timestamp).max()))
    }
}
