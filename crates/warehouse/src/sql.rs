//! Merge statement construction
//!
//! Builds the MERGE that reconciles a freshly loaded temp table into the
//! main timeline table. The statement carries the whole exactly-once
//! guarantee:
//!
//! - The source side deduplicates the temp table per `(entity_id,
//!   last_changed)`, keeping the row with the latest `last_updated`.
//! - Matched keys update every mutable column in place, so a re-export
//!   refreshes derived features instead of duplicating rows.
//! - Unmatched keys insert the full column list.
//!
//! Table names are interpolated into SQL text, so both table references
//! are re-validated here even though config validation already ran.
//! Validation is character-class based; nothing that passes can break
//! out of a backtick-quoted identifier.

use chrono::{DateTime, Utc};
use hearth_config::TableRef;
use hearth_record::{TABLE_SCHEMA, merge_update_columns};

use crate::error::Result;

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;

/// Temp table prefix for direct (streaming insert) exports
pub const TEMP_TABLE_PREFIX: &str = "temp_export";

/// Temp table prefix for bulk (staging file load) exports
pub const BULK_TEMP_TABLE_PREFIX: &str = "temp_bulk_export";

/// Unique-enough temp table name for one merge cycle
pub fn temp_table_name(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{}", at.timestamp())
}

/// Build the MERGE statement from `source` (temp) into `target` (main).
///
/// Both references are validated before interpolation.
pub fn merge_statement(target: &TableRef, source: &TableRef) -> Result<String> {
    target.validate()?;
    source.validate()?;

    let insert_columns: Vec<&str> = TABLE_SCHEMA.iter().map(|f| f.name).collect();
    let insert_list = insert_columns.join(", ");
    let insert_values = insert_columns
        .iter()
        .map(|name| format!("source.{name}"))
        .collect::<Vec<_>>()
        .join(", ");

    let update_set = merge_update_columns()
        .iter()
        .map(|name| format!("{name} = source.{name}"))
        .collect::<Vec<_>>()
        .join(",\n    ");

    Ok(format!(
        r"MERGE `{target}` AS target
USING (
  SELECT * EXCEPT (row_num)
  FROM (
    SELECT
      *,
      ROW_NUMBER() OVER (
        PARTITION BY entity_id, last_changed
        ORDER BY last_updated DESC
      ) AS row_num
    FROM `{source}`
    WHERE entity_id IS NOT NULL AND last_changed IS NOT NULL
  )
  WHERE row_num = 1
) AS source
ON target.entity_id = source.entity_id
  AND target.last_changed = source.last_changed
WHEN MATCHED THEN UPDATE SET
    {update_set}
WHEN NOT MATCHED THEN INSERT ({insert_list})
VALUES ({insert_values})"
    ))
}
