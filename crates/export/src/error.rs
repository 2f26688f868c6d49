//! Export errors
//!
//! The taxonomy follows how a failure should be presented: configuration
//! and credential problems are setup failures, store and warehouse
//! problems are run failures, and `ChunkFailed` wraps a run failure with
//! the position where a chunked export stopped.

use crate::store::StoreError;

/// Errors from an export run
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Invalid configuration, identifier or credential payload.
    /// Never retried.
    #[error(transparent)]
    Config(#[from] hearth_config::ConfigError),

    /// Source store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Destination warehouse failure
    #[error(transparent)]
    Warehouse(#[from] hearth_warehouse::WarehouseError),

    /// A chunked run stopped at this chunk; earlier chunks stay committed
    #[error("chunk {index} of {total} failed: {source}")]
    ChunkFailed {
        /// 1-based position in the run
        index: u32,
        total: u32,
        #[source]
        source: Box<ExportError>,
    },

    /// Another export is already running against this destination
    #[error("an export is already in progress")]
    InProgress,

    /// The previous run finished too recently
    #[error("export requested too soon, retry in {remaining_secs}s")]
    Cooldown { remaining_secs: u64 },

    /// The blocking export task panicked or was aborted
    #[error("export task failed: {0}")]
    Task(String),
}

impl ExportError {
    pub(crate) fn chunk_failed(index: u32, total: u32, source: ExportError) -> Self {
        Self::ChunkFailed {
            index,
            total,
            source: Box::new(source),
        }
    }
}

/// Convenience alias for export results
pub type Result<T> = std::result::Result<T, ExportError>;
