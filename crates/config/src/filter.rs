//! Entity filter configuration
//!
//! Which entities a run exports and which attributes are redacted before
//! storage. Loaded once per export run; immutable while the run is active.
//!
//! The two pattern lists are deliberately independent: `include_patterns`
//! only matters in include mode, `exclude_patterns` only in exclude mode.
//! (An earlier revision overloaded one list with both polarities, which
//! read as a bug to everyone who met it.)

use std::collections::BTreeMap;

use serde::Deserialize;

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;

/// Filter polarity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Export only entities matching `include_patterns`; an empty list
    /// exports nothing
    Include,
    /// Export everything except entities matching `exclude_patterns`;
    /// an empty list excludes nothing (default)
    #[default]
    Exclude,
}

/// Entity filtering and attribute redaction configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter polarity
    pub mode: FilterMode,

    /// Allow-list globs, consulted in include mode
    pub include_patterns: Vec<String>,

    /// Deny-list globs, consulted in exclude mode
    pub exclude_patterns: Vec<String>,

    /// Entity glob -> attribute names stripped before storage
    /// (e.g. redact GPS coordinates from tracker entities)
    pub denied_attributes: BTreeMap<String, Vec<String>>,
}

impl FilterConfig {
    /// Set the filter mode
    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add an include-mode pattern
    pub fn with_include_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Add an exclude-mode pattern
    pub fn with_exclude_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Deny a set of attributes for entities matching a glob
    pub fn with_denied_attributes(
        mut self,
        entity_pattern: impl Into<String>,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.denied_attributes.insert(
            entity_pattern.into(),
            attributes.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// The pattern list active under the configured mode
    pub fn active_patterns(&self) -> &[String] {
        match self.mode {
            FilterMode::Include => &self.include_patterns,
            FilterMode::Exclude => &self.exclude_patterns,
        }
    }
}
