//! Hearth - Configuration
//!
//! One explicit, validated configuration structure resolved once at
//! startup. The pipeline never reaches into loosely-typed option maps at
//! run time; everything it needs is checked here first, and identifier
//! validation is repeated at the last moment before any query text is
//! built.
//!
//! # Parsing
//!
//! ```
//! use hearth_config::ExporterConfig;
//! use std::str::FromStr;
//!
//! let config = ExporterConfig::from_str(
//!     r#"
//!     [warehouse]
//!     project = "my-project"
//!     dataset = "home"
//!     table = "timeline"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.warehouse.table, "timeline");
//! ```

mod credentials;
mod error;
mod export;
mod filter;
mod identifiers;

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

pub use credentials::ServiceAccountKey;
pub use error::{ConfigError, Result};
pub use export::{
    DEFAULT_BATCH_SIZE, DEFAULT_BULK_THRESHOLD, DEFAULT_COOLDOWN, DEFAULT_INTER_CHUNK_PAUSE,
    DEFAULT_MAX_CHUNK_DAYS, ESTIMATED_BYTES_PER_RECORD, ExportTuning,
};
pub use filter::{FilterConfig, FilterMode};
pub use identifiers::{TableRef, is_valid_dataset_id, is_valid_project_id, is_valid_table_id};

/// Main exporter configuration
///
/// The filter and tuning sections are optional with sensible defaults;
/// the warehouse section is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
    /// Destination table identifiers
    pub warehouse: TableRef,

    /// Credential payload (service-account key JSON), if the host passes
    /// it through configuration rather than injecting a client directly
    #[serde(default)]
    pub service_account_key: Option<String>,

    /// Entity filtering and attribute redaction
    #[serde(default)]
    pub filter: FilterConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub export: ExportTuning,
}

impl ExporterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        contents.parse()
    }

    /// Validate everything that can be checked without touching the network
    pub fn validate(&self) -> Result<()> {
        self.warehouse.validate()?;

        if let Some(key) = &self.service_account_key {
            ServiceAccountKey::parse(key)?;
        }

        if self.export.batch_size == 0 {
            return Err(ConfigError::invalid_value("batch_size", "must be at least 1"));
        }
        if self.export.max_chunk_days <= 0 {
            return Err(ConfigError::invalid_value(
                "max_chunk_days",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

impl FromStr for ExporterConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
