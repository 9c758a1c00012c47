//! Horizon Grid - row and column state for data-table widgets.
//!
//! This crate is the view-model layer that sits between a table widget and
//! the rows passed into it. It tracks selection, detail-row expansion, tree
//! node expansion and the current row across data refreshes, and derives the
//! rendered column order from a nested column configuration.
//!
//! Rows are matched across refreshes by a configurable [`RowKey`]; without
//! one, only the very same row handles are recognized.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use horizon_grid::{Row, RowId, TableOptions, TableStore};
//!
//! let options = TableOptions::from_json_str(r#"{ "rowKey": "id" }"#).unwrap();
//! let mut store = TableStore::new(options);
//!
//! let rows: Vec<Row> = (1..=3).map(|id| Row::new(json!({ "id": id }))).collect();
//! store.set_data(rows.clone());
//! store.toggle_row_selection(&rows[0], Some(true), false);
//!
//! // New handles for the same logical rows: the selection follows by key
//! // and keeps the originally selected handle.
//! let refreshed: Vec<Row> = (1..=3).map(|id| Row::new(json!({ "id": id }))).collect();
//! store.set_data(refreshed);
//! assert_eq!(store.selection().len(), 1);
//!
//! store.set_expand_row_keys(&[RowId::Int(2)]).unwrap();
//! assert_eq!(store.expanded_rows().len(), 1);
//! ```
//!
//! # Logging
//!
//! Diagnostics go through `tracing` under the `horizon_grid::*` targets
//! listed in [`logging::targets`]. The crate never
//! installs a subscriber.

pub mod error;
pub mod logging;
pub mod options;
pub mod table;

pub use error::{Result, TableError};
pub use options::{TableOptions, TreeProps, DEFAULT_TOGGLE_ALL_DELAY_MS};
pub use table::{
    Column, ColumnKind, ColumnLayout, Dimension, FixedSide, Row, RowBuilder, RowId, RowKey,
    TableEvent, TableStore,
};

pub use horizon_grid_core::{ConnectionGuard, ConnectionId, Signal};
