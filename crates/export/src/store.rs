//! Source store contract
//!
//! The exporter reads the local time-series store through this trait.
//! Rows stream through iterators so a multi-million row window never
//! materializes in memory; only record batches do.

use hearth_record::{EventRow, StateRow};

use crate::window::ExportWindow;

/// Errors from the source store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A query against the store failed
    #[error("store query failed: {0}")]
    Query(String),

    /// The store is not reachable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

/// Streaming iterator of store rows
pub type RowIter<'a, T> = Box<dyn Iterator<Item = Result<T, StoreError>> + Send + 'a>;

/// Read access to the source store's states and events tables.
///
/// All methods take a half-open window. Implementations must return
/// state rows in `last_updated` order; event rows in `time_fired` order.
pub trait StateStore: Send + Sync {
    /// Number of state rows in the window, for strategy selection.
    fn count_states(&self, window: &ExportWindow) -> Result<u64, StoreError>;

    /// Stream state rows in the window, oldest first.
    fn state_rows<'a>(&'a self, window: &ExportWindow) -> Result<RowIter<'a, StateRow>, StoreError>;

    /// Stream event rows of the given types in the window, oldest first.
    /// An empty `event_types` list yields no rows.
    fn event_rows<'a>(
        &'a self,
        window: &ExportWindow,
        event_types: &[String],
    ) -> Result<RowIter<'a, EventRow>, StoreError>;
}
