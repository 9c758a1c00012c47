//! Detail-row expansion state.

use std::collections::HashSet;

use super::identity::{KeysMap, RowKey};
use super::notifier::{ChangeNotifier, TableEvent};
use super::row::{toggle_membership, Row, RowId, RowRefSet};
use crate::error::{Result, TableError};
use crate::logging::targets;

/// Owns the list of rows whose detail panel is open.
#[derive(Debug, Default)]
pub struct ExpansionStore {
    expand_rows: Vec<Row>,
}

impl ExpansionStore {
    /// Nothing expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expanded rows, in expansion order.
    pub fn expanded_rows(&self) -> &[Row] {
        &self.expand_rows
    }

    /// Re-derive the expanded rows after a data change.
    ///
    /// With `default_expand_all`, every top-level row is expanded. Otherwise
    /// rows are matched by identity when a key is configured; without a key
    /// the list is emptied.
    pub fn update_expand_rows(&mut self, data: &[Row], key: Option<&RowKey>, default_expand_all: bool) {
        let mut seen = RowRefSet::default();
        self.expand_rows = if default_expand_all {
            data.iter().filter(|row| seen.insert(row)).cloned().collect()
        } else if let Some(key) = key {
            let expanded = KeysMap::build(&self.expand_rows, key);
            data.iter()
                .filter(|row| expanded.contains_row(row, key) && seen.insert(row))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        tracing::trace!(
            target: targets::EXPANSION,
            expanded = self.expand_rows.len(),
            default_expand_all,
            "expanded rows updated"
        );
    }

    /// Toggle, or force, `row`'s expansion. On change emits `expand-change`
    /// and requests a relayout.
    pub fn toggle_row_expansion(
        &mut self,
        row: &Row,
        desired: Option<bool>,
        notifier: &ChangeNotifier,
    ) -> bool {
        if !toggle_membership(&mut self.expand_rows, row, desired) {
            return false;
        }
        tracing::debug!(
            target: targets::EXPANSION,
            expanded = self.expand_rows.len(),
            "row expansion toggled"
        );
        notifier.emit(TableEvent::ExpandChange {
            row: row.clone(),
            expanded_rows: self.expand_rows.clone(),
        });
        notifier.schedule_layout();
        true
    }

    /// Replace the expanded rows with the rows of `data` matching `keys`.
    ///
    /// Keys without a matching row are skipped and repeated keys expand their
    /// row once. Fails without a row key and
    /// leaves the current list untouched.
    pub fn set_expand_row_keys(&mut self, keys: &[RowId], data: &[Row], key: Option<&RowKey>) -> Result<()> {
        let key = key.ok_or(TableError::missing_row_key("set_expand_row_keys"))?;
        let keys_map = KeysMap::build(data, key);
        let mut seen = HashSet::new();
        self.expand_rows = keys
            .iter()
            .filter_map(|id| keys_map.get(id))
            .filter(|entry| seen.insert(entry.index))
            .map(|entry| entry.row.clone())
            .collect();
        tracing::debug!(
            target: targets::EXPANSION,
            requested = keys.len(),
            expanded = self.expand_rows.len(),
            "expanded rows set by key"
        );
        Ok(())
    }

    /// Whether `row` is expanded: by identity with a key, by reference without.
    pub fn is_row_expanded(&self, row: &Row, key: Option<&RowKey>) -> bool {
        match key {
            Some(key) => match key.resolve(row) {
                Some(id) => self.expand_rows.iter().any(|r| key.resolve(r).as_ref() == Some(&id)),
                None => false,
            },
            None => self.expand_rows.iter().any(|r| Row::ptr_eq(r, row)),
        }
    }
}
