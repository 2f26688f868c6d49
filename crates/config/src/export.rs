//! Export pipeline tuning
//!
//! Batch sizes, strategy thresholds and pacing. All fields default to the
//! values the pipeline was sized for; only override what you need.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;

/// Rows per direct-insert batch before a merge flush
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Row count above which the bulk-file path takes over (exclusive)
pub const DEFAULT_BULK_THRESHOLD: u64 = 10_000;

/// Maximum days per chunk when a window gets subdivided
pub const DEFAULT_MAX_CHUNK_DAYS: i64 = 7;

/// Cooldown between successive export runs
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Pause between chunks to bound load on the source store
pub const DEFAULT_INTER_CHUNK_PAUSE: Duration = Duration::from_secs(1);

/// Estimated staging bytes per record, for the disk-space precondition
pub const ESTIMATED_BYTES_PER_RECORD: u64 = 400;

/// Tuning knobs for the export pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportTuning {
    /// Rows per direct-insert batch
    pub batch_size: usize,

    /// Row count above which the bulk-file path is used (exclusive)
    pub bulk_threshold: u64,

    /// Whether the bulk-file path is available at all
    pub bulk_enabled: bool,

    /// Maximum days per chunk; windows wider than this are subdivided
    pub max_chunk_days: i64,

    /// Seconds a new run must wait after the previous one finished
    pub cooldown_secs: u64,

    /// Milliseconds to pause between chunks
    pub inter_chunk_pause_ms: u64,

    /// Whether event rows are exported alongside states
    pub include_events: bool,

    /// Event types pulled when event export is enabled
    pub event_types: Vec<String>,

    /// Writable directory for staging files (the host's data directory)
    pub staging_dir: PathBuf,
}

impl Default for ExportTuning {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            bulk_threshold: DEFAULT_BULK_THRESHOLD,
            bulk_enabled: true,
            max_chunk_days: DEFAULT_MAX_CHUNK_DAYS,
            cooldown_secs: DEFAULT_COOLDOWN.as_secs(),
            inter_chunk_pause_ms: DEFAULT_INTER_CHUNK_PAUSE.as_millis() as u64,
            include_events: false,
            event_types: vec![
                "call_service".into(),
                "automation_triggered".into(),
                "script_started".into(),
            ],
            staging_dir: std::env::temp_dir(),
        }
    }
}

impl ExportTuning {
    /// Set the direct-insert batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the bulk threshold
    pub fn with_bulk_threshold(mut self, threshold: u64) -> Self {
        self.bulk_threshold = threshold;
        self
    }

    /// Enable or disable the bulk-file path
    pub fn with_bulk_enabled(mut self, enabled: bool) -> Self {
        self.bulk_enabled = enabled;
        self
    }

    /// Set the maximum chunk width in days
    pub fn with_max_chunk_days(mut self, days: i64) -> Self {
        self.max_chunk_days = days;
        self
    }

    /// Enable event export
    pub fn with_events(mut self, enabled: bool) -> Self {
        self.include_events = enabled;
        self
    }

    /// Set the staging directory
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    /// Cooldown as a `Duration`
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Inter-chunk pause as a `Duration`
    pub fn inter_chunk_pause(&self) -> Duration {
        Duration::from_millis(self.inter_chunk_pause_ms)
    }
}
