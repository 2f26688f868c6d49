//! Status reporting
//!
//! The worker thread publishes progress as messages on an unbounded
//! channel; the owning async context consumes them at its leisure. The
//! reporter is cheap to clone and silently drops events once the
//! receiver is gone, so a caller that never reads status costs nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;

/// Progress is logged and published every this many records
const PROGRESS_INTERVAL: u64 = 100_000;

/// Phases of an export run, in rough order of occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Initializing,
    Connecting,
    Planning,
    Exporting,
    Uploading,
    Merging,
    Completed,
    Failed,
}

impl ExportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Connecting => "connecting",
            Self::Planning => "planning",
            Self::Exporting => "exporting",
            Self::Uploading => "uploading",
            Self::Merging => "merging",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chunk position within a chunked run, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    pub index: u32,
    pub total: u32,
}

/// One progress message from a running export
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub phase: ExportPhase,
    pub message: String,
    /// Records produced so far across the whole run
    pub records_exported: u64,
    /// Set while a chunked run is in progress
    pub chunk: Option<ChunkProgress>,
}

struct Inner {
    sender: Option<mpsc::UnboundedSender<StatusEvent>>,
    records: AtomicU64,
    next_milestone: AtomicU64,
}

/// Publishes status events and tracks the run-wide record count.
#[derive(Clone)]
pub struct ProgressReporter {
    inner: Arc<Inner>,
}

impl ProgressReporter {
    /// A reporter publishing to `sender`; `None` makes every publish a no-op.
    pub fn new(sender: Option<mpsc::UnboundedSender<StatusEvent>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                sender,
                records: AtomicU64::new(0),
                next_milestone: AtomicU64::new(PROGRESS_INTERVAL),
            }),
        }
    }

    /// A reporter that publishes nowhere, for tests and fire-and-forget runs.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Publish a phase transition.
    pub fn phase(&self, phase: ExportPhase, message: impl Into<String>) {
        self.publish(phase, message.into(), None);
    }

    /// Publish a phase transition with chunk position attached.
    pub fn chunk_phase(
        &self,
        phase: ExportPhase,
        message: impl Into<String>,
        chunk: ChunkProgress,
    ) {
        self.publish(phase, message.into(), Some(chunk));
    }

    /// Count produced records; logs and publishes at fixed intervals.
    pub fn add_records(&self, count: u64) {
        let total = self.inner.records.fetch_add(count, Ordering::Relaxed) + count;
        let milestone = self.inner.next_milestone.load(Ordering::Relaxed);
        if total >= milestone {
            self.inner
                .next_milestone
                .store(total - total % PROGRESS_INTERVAL + PROGRESS_INTERVAL, Ordering::Relaxed);
            tracing::info!(records = total, "export progress");
            self.publish(ExportPhase::Exporting, format!("{total} records"), None);
        }
    }

    /// Records produced so far across the run.
    pub fn records(&self) -> u64 {
        self.inner.records.load(Ordering::Relaxed)
    }

    fn publish(&self, phase: ExportPhase, message: String, chunk: Option<ChunkProgress>) {
        tracing::debug!(phase = %phase, message = %message, "export status");
        if let Some(sender) = &self.inner.sender {
            // A dropped receiver is fine; status is advisory.
            let _ = sender.send(StatusEvent {
                phase,
                message,
                records_exported: self.records(),
                chunk,
            });
        }
    }
}
