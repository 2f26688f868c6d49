//! Chunk Scheduler - Wide windows in digestible pieces
//!
//! Splits a window wider than the chunk limit into consecutive
//! sub-windows and exports them newest first, so the freshest data lands
//! even when a long backfill is interrupted partway.
//!
//! In smart mode the scheduler first asks the warehouse for its latest
//! `export_timestamp` watermark and clamps the window's start forward to
//! it. A window fully behind the watermark is a no-op that touches the
//! source store zero times.
//!
//! A failing chunk aborts the rest of the run; chunks merged before it
//! stay committed, and the error names the failing position.

use std::sync::Arc;

use chrono::Duration;
use hearth_config::TableRef;
use hearth_warehouse::Warehouse;

use crate::error::{ExportError, Result};
use crate::range::{ExportStats, RangeExporter};
use crate::status::{ChunkProgress, ExportPhase, ProgressReporter};
use crate::window::ExportWindow;

#[cfg(test)]
#[path = "chunk_test.rs"]
mod tests;

/// Partition `window` into sub-windows of at most `max_chunk_days`,
/// newest first. Boundaries are walked backwards from the end, so only
/// the oldest chunk can be short.
pub fn plan_chunks(window: &ExportWindow, max_chunk_days: i64) -> Vec<ExportWindow> {
    let span = Duration::days(max_chunk_days.max(1));
    let mut chunks = Vec::new();
    let mut end = window.end;
    while end > window.start {
        let start = (end - span).max(window.start);
        chunks.push(ExportWindow::new(start, end));
        end = start;
    }
    chunks
}

/// Drives one chunked export run.
pub struct ChunkScheduler<'a> {
    exporter: &'a RangeExporter,
    warehouse: Arc<dyn Warehouse>,
    target: TableRef,
    max_chunk_days: i64,
    inter_chunk_pause: std::time::Duration,
    reporter: ProgressReporter,
}

impl<'a> ChunkScheduler<'a> {
    pub fn new(
        exporter: &'a RangeExporter,
        warehouse: Arc<dyn Warehouse>,
        target: TableRef,
        max_chunk_days: i64,
        inter_chunk_pause: std::time::Duration,
        reporter: ProgressReporter,
    ) -> Self {
        Self {
            exporter,
            warehouse,
            target,
            max_chunk_days,
            inter_chunk_pause,
            reporter,
        }
    }

    /// Export `window` chunk by chunk. Blocking; run from a worker thread.
    pub fn export_chunked(&self, window: &ExportWindow, smart: bool) -> Result<ExportStats> {
        let window = if smart {
            self.reporter
                .phase(ExportPhase::Planning, "checking export watermark");
            match self.warehouse.max_export_timestamp(&self.target)? {
                Some(watermark) => match window.clamp_start(watermark) {
                    Some(clamped) => {
                        if clamped != *window {
                            tracing::info!(
                                watermark = %watermark,
                                window = %clamped,
                                "clamped window to watermark"
                            );
                        }
                        clamped
                    }
                    None => {
                        tracing::info!(watermark = %watermark, "no new data since last export");
                        self.reporter
                            .phase(ExportPhase::Planning, "no new data since last export");
                        return Ok(ExportStats::default());
                    }
                },
                None => *window,
            }
        } else {
            *window
        };

        let chunks = plan_chunks(&window, self.max_chunk_days);
        let total = chunks.len() as u32;
        tracing::info!(window = %window, chunks = total, "starting chunked export");

        let mut stats = ExportStats::default();
        for (i, chunk) in chunks.iter().enumerate() {
            let index = i as u32 + 1;
            self.reporter.chunk_phase(
                ExportPhase::Exporting,
                format!("chunk {index}/{total}: {chunk}"),
                ChunkProgress { index, total },
            );

            match self.exporter.export(chunk) {
                Ok(chunk_stats) => stats.absorb(&chunk_stats),
                Err(err) => {
                    tracing::error!(chunk = index, total, error = %err, "chunk failed, aborting run");
                    return Err(ExportError::chunk_failed(index, total, err));
                }
            }

            if index < total && !self.inter_chunk_pause.is_zero() {
                std::thread::sleep(self.inter_chunk_pause);
            }
        }

        Ok(stats)
    }
}
