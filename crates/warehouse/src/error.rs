//! Warehouse errors

use std::path::PathBuf;

/// Errors from the warehouse layer
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// A query against the warehouse failed
    #[error("warehouse query failed: {0}")]
    Query(String),

    /// A bulk load job failed
    #[error("load job failed for '{}': {message}", .path.display())]
    Load { path: PathBuf, message: String },

    /// Identifier or credential validation failed
    #[error(transparent)]
    Config(#[from] hearth_config::ConfigError),

    /// Local I/O while staging records
    #[error("staging I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Not enough free disk space to stage the export
    #[error("insufficient disk space: need {needed} bytes, {available} available")]
    DiskSpace { needed: u64, available: u64 },
}

impl WarehouseError {
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias for warehouse results
pub type Result<T> = std::result::Result<T, WarehouseError>;
