//! The coordinating table store.
//!
//! [`TableStore`] owns the data and one instance of each state component
//! (selection, detail expansion, tree state, current row, column layout) and
//! runs them in a fixed order whenever its inputs change. All mutation goes
//! through `&mut self` methods; observers listen on the store's
//! [`ChangeNotifier`] signals.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use serde_json::json;
//! use horizon_grid::{Row, TableEvent, TableOptions, TableStore};
//!
//! let mut store = TableStore::new(TableOptions::default().with_row_key("id"));
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = seen.clone();
//! store.events().connect(move |event: &TableEvent| seen_clone.lock().push(event.name()));
//!
//! let rows: Vec<Row> = (1..=3).map(|id| Row::new(json!({ "id": id }))).collect();
//! store.set_data(rows.clone());
//! store.toggle_row_selection(&rows[0], Some(true), true);
//!
//! assert!(store.is_selected(&rows[0]));
//! assert_eq!(*seen.lock(), vec!["select", "selection-change"]);
//! ```

use std::sync::Arc;
use std::time::Instant;

use horizon_grid_core::{Debouncer, Signal};

use super::column::{normalize, Column, ColumnLayout};
use super::current::CurrentRow;
use super::expansion::ExpansionStore;
use super::identity::{resolve_identity, KeysMap, RowKey};
use super::notifier::{ChangeNotifier, TableEvent};
use super::row::{Row, RowId};
use super::selection::{SelectablePredicate, SelectionStore};
use super::tree::VisibleRows;
use super::tree_state::TreeState;
use crate::error::Result;
use crate::logging::targets;
use crate::options::TableOptions;

/// Work deferred through the debounce queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingTask {
    ToggleAllSelection,
}

/// The row inputs and the visible projection derived from them.
#[derive(Debug, Default)]
struct RowSource {
    data: Vec<Row>,
    lazy_tree_data: Vec<Row>,
    expand_selectable: bool,
    visible: VisibleRows,
}

impl RowSource {
    fn visible(&mut self) -> &[Row] {
        self.visible
            .get(&self.data, &self.lazy_tree_data, self.expand_selectable)
    }
}

/// State store for a data-table widget.
#[derive(Debug)]
pub struct TableStore {
    options: TableOptions,
    row_key: Option<RowKey>,
    rows: RowSource,
    selection: SelectionStore,
    expansion: ExpansionStore,
    tree: TreeState,
    current: CurrentRow,
    raw_columns: Vec<Column>,
    layout: ColumnLayout,
    notifier: ChangeNotifier,
    pending: Debouncer<PendingTask>,
    disposed: bool,
}

static_assertions::assert_impl_all!(TableStore: Send);

impl Default for TableStore {
    fn default() -> Self {
        Self::new(TableOptions::default())
    }
}

impl TableStore {
    /// Create an empty store.
    pub fn new(options: TableOptions) -> Self {
        let row_key = options.row_key.as_deref().map(RowKey::path);
        let rows = RowSource {
            expand_selectable: options.expand_selectable,
            ..RowSource::default()
        };
        tracing::debug!(
            target: targets::STORE,
            row_key = ?row_key,
            reserve_selection = options.reserve_selection,
            "table store created"
        );
        Self {
            selection: SelectionStore::new(options.select_on_indeterminate),
            pending: Debouncer::new(options.toggle_all_delay()),
            row_key,
            rows,
            expansion: ExpansionStore::new(),
            tree: TreeState::new(),
            current: CurrentRow::new(),
            raw_columns: Vec::new(),
            layout: ColumnLayout::default(),
            notifier: ChangeNotifier::new(),
            disposed: false,
            options,
        }
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// The options the store was created with, as since modified.
    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// The configured row key.
    pub fn row_key(&self) -> Option<&RowKey> {
        self.row_key.as_ref()
    }

    /// Replace the row key. Existing state is reconciled on the next data change.
    pub fn set_row_key(&mut self, key: Option<RowKey>) {
        tracing::debug!(target: targets::STORE, row_key = ?key, "row key changed");
        self.options.row_key = match &key {
            Some(RowKey::Path(path)) => Some(path.as_str().to_string()),
            _ => None,
        };
        self.row_key = key;
    }

    /// Install the selectability predicate. It receives each visible row and
    /// its index.
    pub fn set_selectable<F>(&mut self, selectable: F)
    where
        F: Fn(&Row, usize) -> bool + Send + Sync + 'static,
    {
        let predicate: SelectablePredicate = Arc::new(selectable);
        self.selection.set_selectable(Some(predicate));
        self.update_all_selected();
    }

    /// Make every row selectable again.
    pub fn clear_selectable(&mut self) {
        self.selection.set_selectable(None);
        self.update_all_selected();
    }

    /// Keep selected rows across data changes by re-resolving them by key.
    pub fn set_reserve_selection(&mut self, reserve: bool) {
        self.options.reserve_selection = reserve;
    }

    /// Choose what select-all does from an indeterminate state.
    pub fn set_select_on_indeterminate(&mut self, enabled: bool) {
        self.options.select_on_indeterminate = enabled;
        self.selection.set_select_on_indeterminate(enabled);
    }

    /// Expand every row and tree node on the next data change.
    pub fn set_default_expand_all(&mut self, enabled: bool) {
        self.options.default_expand_all = enabled;
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    /// The store's signals.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Named change events.
    pub fn events(&self) -> &Signal<TableEvent> {
        &self.notifier.events
    }

    /// Relayout requests.
    pub fn layout_requested(&self) -> &Signal<()> {
        &self.notifier.layout_requested
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// The top-level rows.
    pub fn data(&self) -> &[Row] {
        &self.rows.data
    }

    /// Replace the data and reconcile all row state against it.
    #[tracing::instrument(skip_all, target = "horizon_grid::store", level = "trace")]
    pub fn set_data(&mut self, data: Vec<Row>) {
        self.rows.data = data;
        self.rows.visible.invalidate();

        if self.options.reserve_selection {
            self.update_selection_by_row_key();
        } else {
            self.reconcile_after_data_change();
        }
        self.update_all_selected();
        self.update_expand_rows();
        self.tree.reconcile(
            &self.rows.data,
            &self.rows.lazy_tree_data,
            self.row_key.as_ref(),
            self.options.default_expand_all,
        );
        self.current
            .reconcile(&self.rows.data, self.row_key.as_ref(), &self.notifier);
        self.notifier.schedule_layout();

        tracing::debug!(
            target: targets::STORE,
            rows = self.rows.data.len(),
            selected = self.selection.selection().len(),
            "data replaced"
        );
    }

    /// Parse a JSON array of rows using the configured tree field names and
    /// replace the data with it.
    pub fn set_data_from_json(&mut self, text: &str) -> Result<()> {
        let rows = Row::list_from_json_str(text, &self.options.tree_props)?;
        self.set_data(rows);
        Ok(())
    }

    /// Rows loaded lazily under tree nodes.
    pub fn lazy_tree_data(&self) -> &[Row] {
        &self.rows.lazy_tree_data
    }

    /// Replace the lazily loaded rows.
    pub fn set_lazy_tree_data(&mut self, rows: Vec<Row>) {
        self.rows.lazy_tree_data = rows;
        self.rows.visible.invalidate();
        self.update_all_selected();
    }

    /// Switch between top-level and flattened-tree selection.
    pub fn set_expand_selectable(&mut self, enabled: bool) {
        if self.rows.expand_selectable != enabled {
            self.rows.expand_selectable = enabled;
            self.options.expand_selectable = enabled;
            self.rows.visible.invalidate();
            self.update_all_selected();
        }
    }

    /// The rows bulk selection operates on.
    pub fn visible_rows(&mut self) -> &[Row] {
        self.rows.visible()
    }

    /// Resolve the identity of `row` with the configured key.
    pub fn row_identity(&self, row: Option<&Row>) -> Result<Option<RowId>> {
        resolve_identity(row, self.row_key.as_ref())
    }

    /// Identity lookup over the top-level rows, if a key is configured.
    pub fn keys_map(&self) -> Option<KeysMap> {
        self.row_key
            .as_ref()
            .map(|key| KeysMap::build(&self.rows.data, key))
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// The raw column configuration, after normalization adjustments.
    pub fn raw_columns(&self) -> &[Column] {
        &self.raw_columns
    }

    /// The derived column layout.
    pub fn column_layout(&self) -> &ColumnLayout {
        &self.layout
    }

    /// Replace the column configuration and recompute the layout.
    pub fn set_columns(&mut self, columns: Vec<Column>) {
        self.raw_columns = columns;
        self.layout = normalize(&mut self.raw_columns);
        self.notifier.schedule_layout();
    }

    /// A rendered column by id.
    pub fn column_by_id(&self, id: &str) -> Option<&Column> {
        self.layout.column_by_id(id)
    }

    /// A rendered column by lookup key.
    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.layout.column_by_key(key)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// The selected rows.
    pub fn selection(&self) -> &[Row] {
        self.selection.selection()
    }

    /// Whether `row` is selected.
    pub fn is_selected(&self, row: &Row) -> bool {
        self.selection.is_selected(row)
    }

    /// Whether every selectable visible row is selected.
    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected()
    }

    /// Empty the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear_selection(&self.notifier);
    }

    /// Toggle, or force, one row's selection.
    pub fn toggle_row_selection(&mut self, row: &Row, desired: Option<bool>, emit_select: bool) -> bool {
        let changed = self
            .selection
            .toggle_row_selection(row, desired, emit_select, &self.notifier);
        if changed {
            self.update_all_selected();
        }
        changed
    }

    /// Drop selected rows that left the data.
    pub fn reconcile_after_data_change(&mut self) -> bool {
        let visible = self.rows.visible();
        self.selection
            .reconcile_after_data_change(visible, self.row_key.as_ref(), &self.notifier)
    }

    /// Re-resolve the selection against the data by row key. Without a key
    /// this degrades to [`reconcile_after_data_change`](Self::reconcile_after_data_change).
    pub fn update_selection_by_row_key(&mut self) {
        match &self.row_key {
            Some(key) => {
                let visible = self.rows.visible();
                self.selection.update_selection_by_row_key(visible, key);
            }
            None => {
                tracing::warn!(
                    target: targets::SELECTION,
                    "reserved selection needs a row key; falling back to reference reconciliation"
                );
                self.reconcile_after_data_change();
            }
        }
    }

    /// Recompute the "all selected" flag.
    pub fn update_all_selected(&mut self) {
        let data_is_empty = self.rows.data.is_empty();
        let visible = self.rows.visible();
        self.selection.update_all_selected(data_is_empty, visible);
    }

    /// Request the select-all toggle now. See [`toggle_all_selection_at`](Self::toggle_all_selection_at).
    pub fn toggle_all_selection(&mut self) {
        self.toggle_all_selection_at(Instant::now());
    }

    /// Request the select-all toggle at `now`.
    ///
    /// The pass runs once the coalescing window has elapsed without a newer
    /// request; drive it with [`process_pending`](Self::process_pending).
    pub fn toggle_all_selection_at(&mut self, now: Instant) {
        if self.disposed {
            return;
        }
        self.pending.schedule(PendingTask::ToggleAllSelection, now);
    }

    /// Whether deferred work is waiting.
    pub fn has_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Run deferred work that is due at `now`. Returns whether anything ran.
    pub fn process_pending(&mut self, now: Instant) -> bool {
        if self.disposed {
            return false;
        }
        match self.pending.take_due(now) {
            Some(task) => {
                self.run_task(task);
                true
            }
            None => false,
        }
    }

    /// Run deferred work immediately. Returns whether anything ran.
    pub fn flush_pending(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        match self.pending.take_now() {
            Some(task) => {
                self.run_task(task);
                true
            }
            None => false,
        }
    }

    #[tracing::instrument(skip(self), target = "horizon_grid::store", level = "trace")]
    fn run_task(&mut self, task: PendingTask) {
        match task {
            PendingTask::ToggleAllSelection => {
                let visible = self.rows.visible();
                self.selection.toggle_all(visible, &self.notifier);
                self.update_all_selected();
            }
        }
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Rows whose detail panel is open.
    pub fn expanded_rows(&self) -> &[Row] {
        self.expansion.expanded_rows()
    }

    /// Re-derive the expanded rows from the current data.
    pub fn update_expand_rows(&mut self) {
        self.expansion.update_expand_rows(
            &self.rows.data,
            self.row_key.as_ref(),
            self.options.default_expand_all,
        );
    }

    /// Toggle, or force, a row's detail panel.
    pub fn toggle_row_expansion(&mut self, row: &Row, desired: Option<bool>) -> bool {
        self.expansion
            .toggle_row_expansion(row, desired, &self.notifier)
    }

    /// Open exactly the detail panels of the rows with the given identities.
    pub fn set_expand_row_keys(&mut self, keys: &[RowId]) -> Result<()> {
        self.expansion
            .set_expand_row_keys(keys, &self.rows.data, self.row_key.as_ref())
    }

    /// Whether `row`'s detail panel is open.
    pub fn is_row_expanded(&self, row: &Row) -> bool {
        self.expansion.is_row_expanded(row, self.row_key.as_ref())
    }

    /// Toggle, or force, a tree node.
    pub fn toggle_tree_expansion(&mut self, row: &Row, desired: Option<bool>) -> Result<bool> {
        self.tree
            .toggle_tree_expansion(row, desired, self.row_key.as_ref(), &self.notifier)
    }

    /// Whether `row`'s tree node is expanded.
    pub fn is_tree_expanded(&self, row: &Row) -> bool {
        self.tree.is_tree_expanded(row, self.row_key.as_ref())
    }

    /// Expand exactly the tree nodes with the given identities.
    pub fn update_tree_expand_keys(&mut self, keys: &[RowId]) -> Result<()> {
        self.tree.update_tree_expand_keys(
            keys,
            &self.rows.data,
            &self.rows.lazy_tree_data,
            self.row_key.as_ref(),
        )
    }

    /// Tree node state.
    pub fn tree_state(&self) -> &TreeState {
        &self.tree
    }

    /// Apply expand keys to both detail panels and tree nodes.
    pub fn set_expand_row_keys_adapter(&mut self, keys: &[RowId]) -> Result<()> {
        self.set_expand_row_keys(keys)?;
        self.update_tree_expand_keys(keys)
    }

    /// Toggle a row's detail panel when an expand column is configured, its
    /// tree node otherwise. Returns whether anything changed.
    pub fn toggle_row_expansion_adapter(&mut self, row: &Row, desired: Option<bool>) -> Result<bool> {
        if self.layout.has_expand_column() {
            Ok(self.toggle_row_expansion(row, desired))
        } else {
            self.toggle_tree_expansion(row, desired)
        }
    }

    // -------------------------------------------------------------------------
    // Current and hover rows
    // -------------------------------------------------------------------------

    /// The current row.
    pub fn current_row(&self) -> Option<&Row> {
        self.current.current_row()
    }

    /// Make `row` current.
    pub fn set_current_row(&mut self, row: Option<Row>) -> bool {
        self.current.set_current_row(row, &self.notifier)
    }

    /// Make the row with identity `id` current.
    pub fn set_current_row_key(&mut self, id: Option<RowId>) -> Result<()> {
        self.current
            .set_current_row_key(id, &self.rows.data, self.row_key.as_ref(), &self.notifier)
    }

    /// The hovered row.
    pub fn hover_row(&self) -> Option<&Row> {
        self.current.hover_row()
    }

    /// Set the hovered row.
    pub fn set_hover_row(&mut self, row: Option<Row>) {
        self.current.set_hover_row(row);
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Abandon deferred work and disconnect all listeners.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let cancelled = self.pending.cancel();
        self.notifier.disconnect_all();
        self.disposed = true;
        tracing::debug!(target: targets::STORE, cancelled, "table store disposed");
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}
