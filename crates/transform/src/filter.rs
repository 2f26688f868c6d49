//! Entity Filter - Decide which entities leave the machine
//!
//! Filters rows by entity id before any further work is spent on them.
//!
//! # Job To Be Done
//!
//! Most installations track far more entities than they want in the
//! warehouse. The filter runs in one of two modes:
//!
//! - **Include**: only entities matching an include pattern are exported.
//!   An empty include list exports nothing.
//! - **Exclude** (default): entities matching an exclude pattern are
//!   dropped, everything else is exported. An empty exclude list exports
//!   everything.
//!
//! Patterns are shell-style globs (`sensor.*`, `*.battery_level`) matched
//! against the full entity id. Patterns are compiled once at construction;
//! per-row matching does no allocation.
//!
//! # Rust Example
//!
//! ```
//! use hearth_config::{FilterConfig, FilterMode};
//! use hearth_transform::EntityFilter;
//!
//! let config = FilterConfig::default()
//!     .with_mode(FilterMode::Include)
//!     .with_include_pattern("sensor.*")
//!     .with_include_pattern("climate.*");
//!
//! let filter = EntityFilter::new(&config).unwrap();
//! assert!(filter.should_export("sensor.kitchen_temperature"));
//! assert!(!filter.should_export("light.hallway"));
//! ```

use glob::Pattern;
use hearth_config::{ConfigError, FilterConfig, FilterMode};

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;

/// Compiled entity filter.
///
/// Construction validates every glob pattern; matching is infallible.
#[derive(Debug, Clone)]
pub struct EntityFilter {
    mode: FilterMode,
    patterns: Vec<Pattern>,
}

impl EntityFilter {
    /// Compiles the active pattern list of `config`.
    ///
    /// Only the list selected by the mode is compiled: include patterns in
    /// include mode, exclude patterns in exclude mode. The inactive list is
    /// ignored entirely.
    pub fn new(config: &FilterConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .active_patterns()
            .iter()
            .map(|raw| {
                Pattern::new(raw)
                    .map_err(|err| ConfigError::invalid_pattern(raw, err.msg.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            mode: config.mode,
            patterns,
        })
    }

    /// Returns true when `entity_id` should be exported.
    pub fn should_export(&self, entity_id: &str) -> bool {
        let matched = self.patterns.iter().any(|p| p.matches(entity_id));
        match self.mode {
            FilterMode::Include => matched,
            FilterMode::Exclude => !matched,
        }
    }

    /// The mode this filter runs in.
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Number of compiled patterns.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}
