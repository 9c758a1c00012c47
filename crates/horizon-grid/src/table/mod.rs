//! Table state for Horizon Grid.
//!
//! This module holds everything a data-table widget needs to track between
//! renders: which rows are selected, which rows are expanded, which tree
//! nodes are open, which row is current, and how the configured columns are
//! laid out.
//!
//! # Core Types
//!
//! - `Row`: A shared handle to an immutable record, optionally with children
//! - `RowKey`: How a row's stable identity is derived (field path or function)
//! - `TableStore`: The coordinator that owns all state and runs reconciliation
//! - `TableEvent`: Change notifications published on the store's signals
//!
//! # Components
//!
//! - `SelectionStore`: Selected rows and the "all selected" flag
//! - `ExpansionStore`: Rows with an open detail panel
//! - `TreeState`: Expanded flags of tree nodes, per identity
//! - `CurrentRow`: The highlighted row and the hovered row
//! - `ColumnLayout`: Fixed/center/right column groups and leaf columns
//!
//! # Data Flow
//!
//! ```text
//! set_data ──> visible rows (cached) ──> selection / expansion / tree / current
//!                                                  │
//!                                                  └──> ChangeNotifier ──> host
//! ```
//!
//! Every notification corresponds to an actual change: toggling a row to
//! the state it is already in, clearing an empty selection, or reconciling
//! data that removed nothing emits no events.

mod column;
mod current;
mod dimension;
mod expansion;
mod identity;
mod notifier;
mod row;
mod selection;
mod store;
mod tree;
mod tree_state;

pub use column::{normalize, Column, ColumnKind, ColumnLayout, FixedSide};
pub use current::CurrentRow;
pub use dimension::{parse_height, parse_min_width, parse_width, Dimension};
pub use expansion::ExpansionStore;
pub use identity::{resolve_identity, FieldPath, KeyEntry, KeyFn, KeysMap, RowKey};
pub use notifier::{ChangeNotifier, TableEvent};
pub use row::{Row, RowBuilder, RowId, IDENTITY_TAG_FIELD};
pub use selection::{SelectablePredicate, SelectionStore};
pub use store::TableStore;
pub use tree::{flatten, flatten_to_row_list, walk, FlatNode, FlattenOptions, VisibleRows};
pub use tree_state::TreeState;
