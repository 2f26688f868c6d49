//! Export Orchestrator - Single-flight entry point
//!
//! Owns the collaborators, enforces single-flight and the cooldown, and
//! runs the blocking pipeline on a worker thread via
//! `tokio::task::spawn_blocking`. The async caller suspends only at that
//! boundary; everything below it is synchronous.
//!
//! Collaborators arrive through the constructor. The orchestrator never
//! reaches into ambient global state, so tests wire it up with in-memory
//! doubles and production wires real clients, through the same seam.
//!
//! Status flows through the channel handed back at construction. Every
//! run ends in a `Completed` or `Failed` event before the call returns;
//! the in-progress flag is cleared on all paths.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Utc;
use hearth_config::{ExporterConfig, ServiceAccountKey};
use hearth_transform::{EntityRegistry, RecordBuilder};
use hearth_warehouse::Warehouse;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::chunk::ChunkScheduler;
use crate::error::{ExportError, Result};
use crate::range::{ExportStats, RangeExporter};
use crate::status::{ExportPhase, ProgressReporter, StatusEvent};
use crate::store::StateStore;
use crate::window::ExportWindow;

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;

/// Coordinates export runs against one destination.
pub struct ExportOrchestrator {
    config: ExporterConfig,
    store: Arc<dyn StateStore>,
    warehouse: Arc<dyn Warehouse>,
    registry: Option<Arc<dyn EntityRegistry>>,
    status: mpsc::UnboundedSender<StatusEvent>,
    in_progress: Arc<AtomicBool>,
    last_finished: Arc<Mutex<Option<Instant>>>,
}

impl ExportOrchestrator {
    /// Validate `config` and wire up the orchestrator.
    ///
    /// Returns the receiving end of the status stream alongside; drop it
    /// if live progress is not needed.
    pub fn new(
        config: ExporterConfig,
        store: Arc<dyn StateStore>,
        warehouse: Arc<dyn Warehouse>,
        registry: Option<Arc<dyn EntityRegistry>>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<StatusEvent>)> {
        config.validate()?;
        let (status, receiver) = mpsc::unbounded_channel();
        Ok((
            Self {
                config,
                store,
                warehouse,
                registry,
                status,
                in_progress: Arc::new(AtomicBool::new(false)),
                last_finished: Arc::new(Mutex::new(None)),
            },
            receiver,
        ))
    }

    /// Export the last `days` days, ending now.
    pub async fn export_days_back(&self, days: u32) -> Result<ExportStats> {
        self.export_window(ExportWindow::days_back(days, Utc::now()))
            .await
    }

    /// Export one window.
    ///
    /// Rejects immediately with [`ExportError::InProgress`] while another
    /// run is active, and with [`ExportError::Cooldown`] within the
    /// cooldown after the previous run finished. Neither is queued.
    pub async fn export_window(&self, window: ExportWindow) -> Result<ExportStats> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExportError::InProgress);
        }

        if let Some(remaining) = self.cooldown_remaining() {
            self.in_progress.store(false, Ordering::SeqCst);
            return Err(ExportError::Cooldown {
                remaining_secs: remaining.as_secs().max(1),
            });
        }

        let config = self.config.clone();
        let store = Arc::clone(&self.store);
        let warehouse = Arc::clone(&self.warehouse);
        let registry = self.registry.clone();
        let reporter = ProgressReporter::new(Some(self.status.clone()));

        let result =
            tokio::task::spawn_blocking(move || {
                run_export(config, store, warehouse, registry, reporter, window)
            })
            .await
            .unwrap_or_else(|err| Err(ExportError::Task(err.to_string())));

        *self.last_finished.lock() = Some(Instant::now());
        self.in_progress.store(false, Ordering::SeqCst);
        result
    }

    /// True while a run is active.
    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    fn cooldown_remaining(&self) -> Option<std::time::Duration> {
        let last = (*self.last_finished.lock())?;
        let cooldown = self.config.export.cooldown();
        let elapsed = last.elapsed();
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }
}

/// The blocking pipeline for one run.
fn run_export(
    config: ExporterConfig,
    store: Arc<dyn StateStore>,
    warehouse: Arc<dyn Warehouse>,
    registry: Option<Arc<dyn EntityRegistry>>,
    reporter: ProgressReporter,
    window: ExportWindow,
) -> Result<ExportStats> {
    reporter.phase(ExportPhase::Initializing, format!("export of {window}"));
    let started = Instant::now();

    let result = (|| {
        if let Some(key) = &config.service_account_key {
            reporter.phase(ExportPhase::Connecting, "validating credentials");
            ServiceAccountKey::parse(key).map_err(ExportError::from)?;
        }

        warehouse.ensure_table(&config.warehouse)?;

        // One export_timestamp for the whole run, chunked or not.
        let builder = RecordBuilder::new(&config.filter, registry, Utc::now())?;
        let exporter = RangeExporter::new(
            store,
            Arc::clone(&warehouse),
            builder,
            config.warehouse.clone(),
            config.export.clone(),
            reporter.clone(),
        );

        let chunk_limit = chrono::Duration::days(config.export.max_chunk_days);
        if window.duration() > chunk_limit {
            let scheduler = ChunkScheduler::new(
                &exporter,
                warehouse,
                config.warehouse.clone(),
                config.export.max_chunk_days,
                config.export.inter_chunk_pause(),
                reporter.clone(),
            );
            scheduler.export_chunked(&window, true)
        } else {
            exporter.export(&window)
        }
    })();

    match &result {
        Ok(stats) => {
            tracing::info!(
                records = stats.records,
                inserted = stats.inserted,
                updated = stats.updated,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "export completed"
            );
            reporter.phase(
                ExportPhase::Completed,
                format!("exported {} records", stats.records),
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "export failed");
            reporter.phase(ExportPhase::Failed, err.to_string());
        }
    }
    result
}
