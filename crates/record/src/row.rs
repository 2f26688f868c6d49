//! Raw rows as returned by the source store
//!
//! The source store contract speaks epoch seconds and JSON text; everything
//! richer is derived downstream by the transform.

use chrono::{DateTime, Utc};

#[cfg(test)]
#[path = "row_test.rs"]
mod tests;

/// Convert fractional epoch seconds to a UTC datetime
///
/// Returns `None` for timestamps outside chrono's representable range.
pub fn datetime_from_epoch(ts: f64) -> Option<DateTime<Utc>> {
    let secs = ts.floor();
    let nanos = ((ts - secs) * 1e9).round() as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
}

/// One state row from the source store's states table
#[derive(Debug, Clone, PartialEq)]
pub struct StateRow {
    pub entity_id: String,
    pub state: Option<String>,
    /// Raw attributes JSON text, unparsed
    pub attributes: Option<String>,
    pub last_updated_ts: f64,
    pub last_changed_ts: Option<f64>,
    /// When the state was last written, changed or not. Part of the
    /// store's select list, but the warehouse schema keys freshness on
    /// `last_updated`, so no exported column derives from it.
    pub last_reported_ts: Option<f64>,
    pub context_id: Option<String>,
    pub context_user_id: Option<String>,
}

impl StateRow {
    /// Domain prefix of the entity id, if it has one
    pub fn domain(&self) -> Option<&str> {
        self.entity_id.split_once('.').map(|(domain, _)| domain)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        datetime_from_epoch(self.last_updated_ts)
    }

    /// `last_changed`, falling back to `last_updated` when the store
    /// elided it (the store only records it when it differs)
    pub fn last_changed(&self) -> Option<DateTime<Utc>> {
        self.last_changed_ts
            .and_then(datetime_from_epoch)
            .or_else(|| self.last_updated())
    }
}

/// One event row from the source store's events table
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub event_id: i64,
    pub event_type: String,
    /// Raw event payload JSON text, unparsed
    pub event_data: Option<String>,
    pub time_fired_ts: f64,
    pub context_id: Option<String>,
    pub context_user_id: Option<String>,
}

impl EventRow {
    pub fn time_fired(&self) -> Option<DateTime<Utc>> {
        datetime_from_epoch(self.time_fired_ts)
    }
}
