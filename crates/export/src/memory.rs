//! In-process source store
//!
//! A [`StateStore`] over in-memory row vectors, mirroring the store
//! contract: half-open window filtering, timestamp ordering and
//! event-type selection. Backs the exporter test suites; the query
//! counter lets tests assert that smart no-op runs touch the store
//! zero times.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hearth_record::{EventRow, StateRow};
use parking_lot::{Condvar, Mutex};

use crate::store::{RowIter, StateStore, StoreError};
use crate::window::ExportWindow;

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

/// Shared in-memory store. Clones see the same rows.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    states: Arc<Mutex<Vec<StateRow>>>,
    events: Arc<Mutex<Vec<EventRow>>>,
    queries: Arc<AtomicU64>,
    fail_queries: Arc<std::sync::atomic::AtomicBool>,
    gate: Arc<(Mutex<bool>, Condvar)>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_state(&self, row: StateRow) {
        self.states.lock().push(row);
    }

    pub fn push_event(&self, row: EventRow) {
        self.events.lock().push(row);
    }

    /// Store queries answered so far, across all methods.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    /// Make every subsequent query fail, for chunk-abort tests.
    pub fn fail_queries(&self) {
        self.fail_queries.store(true, Ordering::SeqCst);
    }

    /// Block every query until [`release_queries`](Self::release_queries)
    /// is called, so tests can hold a run mid-flight.
    pub fn hold_queries(&self) {
        *self.gate.0.lock() = true;
    }

    /// Unblock queries held by [`hold_queries`](Self::hold_queries).
    pub fn release_queries(&self) {
        let mut held = self.gate.0.lock();
        *held = false;
        self.gate.1.notify_all();
    }

    fn check(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let mut held = self.gate.0.lock();
        while *held {
            self.gate.1.wait(&mut held);
        }
        drop(held);
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected failure"));
        }
        Ok(())
    }
}

impl StateStore for MemoryStateStore {
    fn count_states(&self, window: &ExportWindow) -> Result<u64, StoreError> {
        self.check()?;
        let (start, end) = window.epoch_bounds();
        let count = self
            .states
            .lock()
            .iter()
            .filter(|row| start <= row.last_updated_ts && row.last_updated_ts < end)
            .count();
        Ok(count as u64)
    }

    fn state_rows<'a>(
        &'a self,
        window: &ExportWindow,
    ) -> Result<RowIter<'a, StateRow>, StoreError> {
        self.check()?;
        let (start, end) = window.epoch_bounds();
        let mut rows: Vec<StateRow> = self
            .states
            .lock()
            .iter()
            .filter(|row| start <= row.last_updated_ts && row.last_updated_ts < end)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.last_updated_ts.total_cmp(&b.last_updated_ts));
        Ok(Box::new(rows.into_iter().map(Ok)))
    }

    fn event_rows<'a>(
        &'a self,
        window: &ExportWindow,
        event_types: &[String],
    ) -> Result<RowIter<'a, EventRow>, StoreError> {
        self.check()?;
        let (start, end) = window.epoch_bounds();
        let mut rows: Vec<EventRow> = self
            .events
            .lock()
            .iter()
            .filter(|row| start <= row.time_fired_ts && row.time_fired_ts < end)
            .filter(|row| event_types.iter().any(|t| t == &row.event_type))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.time_fired_ts.total_cmp(&b.time_fired_ts));
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}
