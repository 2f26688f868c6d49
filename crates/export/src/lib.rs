//! Hearth - Export
//!
//! Incremental export of a local time-series state store into an
//! analytical warehouse.
//!
//! # Overview
//!
//! ```text
//! [StateStore] → [RangeExporter] → [Warehouse]
//!                     ↑ ↓
//!        [ChunkScheduler]  [BulkLoader]
//!                     ↑
//!          [ExportOrchestrator]
//! ```
//!
//! The [`ExportOrchestrator`] is the entry point: it owns the
//! collaborators, enforces single-flight and cooldown, and hands the
//! blocking pipeline to a worker thread. Windows wider than the chunk
//! limit go through the [`ChunkScheduler`]; each chunk runs through the
//! [`RangeExporter`], which picks the direct batched path or the
//! [`BulkLoader`] per window.
//!
//! Re-running any window is safe: every path lands rows through a MERGE
//! keyed on `(entity_id, last_changed)`.
//!
//! # Modules
//!
//! - [`store`]: source store contract
//! - [`window`]: half-open export windows
//! - [`status`]: progress channel and phases
//! - [`range`]: single-window export
//! - [`bulk`]: staging-file load path
//! - [`chunk`]: wide-window scheduling
//! - [`orchestrator`]: single-flight entry point
//! - [`memory`]: in-process store, backs the test suites

pub mod bulk;
pub mod chunk;
pub mod error;
pub mod memory;
pub mod orchestrator;
pub mod range;
pub mod status;
pub mod store;
pub mod window;

pub use bulk::BulkLoader;
pub use chunk::{ChunkScheduler, plan_chunks};
pub use error::{ExportError, Result};
pub use memory::MemoryStateStore;
pub use orchestrator::ExportOrchestrator;
pub use range::{ExportStats, RangeExporter};
pub use status::{ChunkProgress, ExportPhase, ProgressReporter, StatusEvent};
pub use store::{RowIter, StateStore, StoreError};
pub use window::ExportWindow;
