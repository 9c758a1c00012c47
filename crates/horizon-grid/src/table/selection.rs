//! Row selection state.
//!
//! The selection is an ordered list of row handles. Membership is by
//! reference; reconciliation against new data uses the row key when one is
//! configured and falls back to reference identity otherwise.

use std::fmt;
use std::sync::Arc;

use super::identity::{KeysMap, RowKey};
use super::notifier::{ChangeNotifier, TableEvent};
use super::row::{toggle_membership, Row, RowRefSet};
use crate::logging::targets;

/// Decides whether a row can be selected. Receives the row and its index in
/// the visible sequence.
pub type SelectablePredicate = Arc<dyn Fn(&Row, usize) -> bool + Send + Sync>;

/// Owns the selected rows and the "all selected" flag.
#[derive(Default)]
pub struct SelectionStore {
    selection: Vec<Row>,
    is_all_selected: bool,
    select_on_indeterminate: bool,
    selectable: Option<SelectablePredicate>,
}

impl fmt::Debug for SelectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionStore")
            .field("selected", &self.selection.len())
            .field("is_all_selected", &self.is_all_selected)
            .field("select_on_indeterminate", &self.select_on_indeterminate)
            .field("has_selectable", &self.selectable.is_some())
            .finish()
    }
}

impl SelectionStore {
    /// An empty selection.
    pub fn new(select_on_indeterminate: bool) -> Self {
        Self {
            select_on_indeterminate,
            ..Self::default()
        }
    }

    /// The selected rows, in selection order.
    pub fn selection(&self) -> &[Row] {
        &self.selection
    }

    /// Whether every selectable visible row is selected.
    pub fn is_all_selected(&self) -> bool {
        self.is_all_selected
    }

    /// Whether `row` is selected (by reference).
    pub fn is_selected(&self, row: &Row) -> bool {
        self.selection.iter().any(|r| Row::ptr_eq(r, row))
    }

    /// Whether select-all from an indeterminate state selects everything.
    pub fn select_on_indeterminate(&self) -> bool {
        self.select_on_indeterminate
    }

    /// Choose what select-all does from an indeterminate state.
    pub fn set_select_on_indeterminate(&mut self, enabled: bool) {
        self.select_on_indeterminate = enabled;
    }

    /// Install or remove the selectability predicate.
    pub fn set_selectable(&mut self, selectable: Option<SelectablePredicate>) {
        self.selectable = selectable;
    }

    fn can_select(&self, row: &Row, index: usize) -> bool {
        self.selectable.as_ref().is_none_or(|f| f(row, index))
    }

    /// Empty the selection. Emits only if something was selected.
    pub fn clear_selection(&mut self, notifier: &ChangeNotifier) {
        self.is_all_selected = false;
        if self.selection.is_empty() {
            return;
        }
        let cleared = std::mem::take(&mut self.selection).len();
        tracing::debug!(target: targets::SELECTION, cleared, "selection cleared");
        notifier.emit(TableEvent::SelectionChange { selection: Vec::new() });
    }

    /// Drop selected rows that are no longer in `visible`.
    ///
    /// With a row key, a selected row survives when some visible row has the
    /// same identity; the selected handle itself is kept. Rows without an
    /// identity never survive. Without a row key, only handles present in
    /// `visible` survive. Emits one `selection-change` if anything was
    /// removed; returns whether it did.
    pub fn reconcile_after_data_change(
        &mut self,
        visible: &[Row],
        key: Option<&RowKey>,
        notifier: &ChangeNotifier,
    ) -> bool {
        let before = self.selection.len();
        match key {
            Some(key) => {
                let data_map = KeysMap::build(visible, key);
                self.selection.retain(|row| data_map.contains_row(row, key));
            }
            None => {
                let present = RowRefSet::from_rows(visible);
                self.selection.retain(|row| present.contains(row));
            }
        }

        let removed = before - self.selection.len();
        if removed == 0 {
            return false;
        }
        tracing::debug!(
            target: targets::SELECTION,
            removed,
            remaining = self.selection.len(),
            "stale rows dropped from selection"
        );
        notifier.emit(TableEvent::SelectionChange {
            selection: self.selection.clone(),
        });
        true
    }

    /// Toggle, or force, `row`'s membership.
    ///
    /// On change, emits `select` (when `emit_select` is set) followed by
    /// `selection-change`. Returns whether membership changed.
    pub fn toggle_row_selection(
        &mut self,
        row: &Row,
        desired: Option<bool>,
        emit_select: bool,
        notifier: &ChangeNotifier,
    ) -> bool {
        if !toggle_membership(&mut self.selection, row, desired) {
            return false;
        }
        tracing::trace!(
            target: targets::SELECTION,
            selected = self.selection.len(),
            "row selection toggled"
        );
        let selection = self.selection.clone();
        if emit_select {
            notifier.emit(TableEvent::Select {
                selection: selection.clone(),
                row: row.clone(),
            });
        }
        notifier.emit(TableEvent::SelectionChange { selection });
        true
    }

    /// Apply the header checkbox to every selectable visible row.
    ///
    /// The target is "select" when nothing is selected (or, with
    /// select-on-indeterminate, when not everything is), and "clear"
    /// otherwise. Unselectable rows are left alone. Emits `selection-change`
    /// if membership changed and always emits `select-all`.
    pub fn toggle_all(&mut self, visible: &[Row], notifier: &ChangeNotifier) {
        let target = if self.select_on_indeterminate {
            !self.is_all_selected
        } else {
            !(self.is_all_selected || !self.selection.is_empty())
        };
        self.is_all_selected = target;

        let mut changed = false;
        for (index, row) in visible.iter().enumerate() {
            if self.can_select(row, index)
                && toggle_membership(&mut self.selection, row, Some(target))
            {
                changed = true;
            }
        }

        tracing::debug!(
            target: targets::SELECTION,
            select = target,
            changed,
            selected = self.selection.len(),
            "select-all applied"
        );
        if changed {
            notifier.emit(TableEvent::SelectionChange {
                selection: self.selection.clone(),
            });
        }
        notifier.emit(TableEvent::SelectAll {
            selection: self.selection.clone(),
        });
    }

    /// Rebuild the selection from `visible`, keeping rows whose identity
    /// was selected before. The new order follows `visible` and the new
    /// handles replace the old ones.
    pub fn update_selection_by_row_key(&mut self, visible: &[Row], key: &RowKey) {
        let selected_map = KeysMap::build(&self.selection, key);
        let previous = self.selection.len();
        let mut seen = RowRefSet::default();
        self.selection = visible
            .iter()
            .filter(|row| selected_map.contains_row(row, key) && seen.insert(row))
            .cloned()
            .collect();
        tracing::trace!(
            target: targets::SELECTION,
            previous,
            kept = self.selection.len(),
            "selection re-resolved by row key"
        );
    }

    /// Recompute the "all selected" flag.
    ///
    /// False when `data_is_empty`, when a selectable row is unselected, or
    /// when nothing is selected at all.
    pub fn update_all_selected(&mut self, data_is_empty: bool, visible: &[Row]) {
        if data_is_empty {
            self.is_all_selected = false;
            return;
        }

        let mut all_selected = true;
        let mut selected_count = 0usize;
        for (index, row) in visible.iter().enumerate() {
            if self.is_selected(row) {
                selected_count += 1;
            } else if self.can_select(row, index) {
                all_selected = false;
                break;
            }
        }

        self.is_all_selected = all_selected && selected_count > 0;
    }
}
