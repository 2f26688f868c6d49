//! Warehouse identifier validation
//!
//! Project/dataset/table names end up interpolated into MERGE statement
//! text, so they are validated against strict allow-patterns before any
//! query is built. Validation happens at config resolution AND again right
//! before interpolation; a name that ever fails is a configuration error,
//! never a retry.

use serde::Deserialize;

use crate::error::{ConfigError, Result};

#[cfg(test)]
#[path = "identifiers_test.rs"]
mod tests;

/// Fully-qualified destination table name
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableRef {
    /// Cloud project id
    pub project: String,
    /// Dataset id
    pub dataset: String,
    /// Table id
    pub table: String,
}

impl TableRef {
    /// Create a table reference, validating every part
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self> {
        let table_ref = Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        };
        table_ref.validate()?;
        Ok(table_ref)
    }

    /// A sibling table in the same project and dataset
    pub fn sibling(&self, table: impl Into<String>) -> Result<Self> {
        Self::new(self.project.clone(), self.dataset.clone(), table)
    }

    /// Validate all three identifiers against their allow-patterns
    pub fn validate(&self) -> Result<()> {
        if !is_valid_project_id(&self.project) {
            return Err(ConfigError::invalid_identifier("project id", &self.project));
        }
        if !is_valid_dataset_id(&self.dataset) {
            return Err(ConfigError::invalid_identifier("dataset id", &self.dataset));
        }
        if !is_valid_table_id(&self.table) {
            return Err(ConfigError::invalid_identifier("table id", &self.table));
        }
        Ok(())
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

/// Project ids: 6-30 chars of lowercase letters, digits and hyphens,
/// neither starting nor ending with a hyphen
pub fn is_valid_project_id(project_id: &str) -> bool {
    let len = project_id.len();
    if !(6..=30).contains(&len) {
        return false;
    }
    if project_id.starts_with('-') || project_id.ends_with('-') {
        return false;
    }
    project_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Dataset ids: 1-1024 chars of letters, digits and underscores
pub fn is_valid_dataset_id(dataset_id: &str) -> bool {
    let len = dataset_id.len();
    (1..=1024).contains(&len)
        && dataset_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Table ids: same allow-pattern as dataset ids
pub fn is_valid_table_id(table_id: &str) -> bool {
    is_valid_dataset_id(table_id)
}
