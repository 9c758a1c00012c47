//! The current (highlighted) row and the hovered row.

use super::identity::{KeysMap, RowKey};
use super::notifier::{ChangeNotifier, TableEvent};
use super::row::{Row, RowId};
use crate::error::{Result, TableError};
use crate::logging::targets;

/// Tracks the single current row.
#[derive(Debug, Default)]
pub struct CurrentRow {
    current: Option<Row>,
    current_key: Option<RowId>,
    hover: Option<Row>,
}

fn same_row(a: Option<&Row>, b: Option<&Row>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Row::ptr_eq(a, b),
        _ => false,
    }
}

impl CurrentRow {
    /// No current row.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current row.
    pub fn current_row(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// The key last requested through [`set_current_row_key`](Self::set_current_row_key).
    pub fn current_row_key(&self) -> Option<&RowId> {
        self.current_key.as_ref()
    }

    /// The hovered row.
    pub fn hover_row(&self) -> Option<&Row> {
        self.hover.as_ref()
    }

    /// Set the hovered row. Emits nothing.
    pub fn set_hover_row(&mut self, row: Option<Row>) {
        self.hover = row;
    }

    /// Make `row` current. Emits `current-change` only if the row changed
    /// (by reference).
    pub fn set_current_row(&mut self, row: Option<Row>, notifier: &ChangeNotifier) -> bool {
        if same_row(self.current.as_ref(), row.as_ref()) {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, row);
        tracing::trace!(
            target: targets::STORE,
            has_current = self.current.is_some(),
            "current row changed"
        );
        notifier.emit(TableEvent::CurrentChange {
            current: self.current.clone(),
            previous,
        });
        true
    }

    /// Make the top-level row with identity `id` current.
    ///
    /// `None`, or an identity no row has, clears the current row. Fails
    /// without a row key.
    pub fn set_current_row_key(
        &mut self,
        id: Option<RowId>,
        data: &[Row],
        key: Option<&RowKey>,
        notifier: &ChangeNotifier,
    ) -> Result<()> {
        let key = key.ok_or(TableError::missing_row_key("set_current_row_key"))?;
        let row = id
            .as_ref()
            .and_then(|id| KeysMap::build(data, key).get(id).map(|entry| entry.row.clone()));
        self.current_key = id;
        self.set_current_row(row, notifier);
        Ok(())
    }

    /// Follow the current row across a data change.
    ///
    /// A current row still present by reference is kept. Otherwise, with a
    /// row key, the row with the same identity (or the requested key) takes
    /// its place; failing that the current row is cleared.
    pub fn reconcile(&mut self, data: &[Row], key: Option<&RowKey>, notifier: &ChangeNotifier) {
        if let Some(current) = &self.current {
            if data.iter().any(|row| Row::ptr_eq(row, current)) {
                return;
            }
        }

        let wanted = match (key, &self.current) {
            (Some(key), Some(current)) => key.resolve(current).or_else(|| self.current_key.clone()),
            (Some(_), None) => self.current_key.clone(),
            (None, _) => None,
        };
        let replacement = match (key, wanted) {
            (Some(key), Some(id)) => KeysMap::build(data, key).get(&id).map(|entry| entry.row.clone()),
            _ => None,
        };
        self.set_current_row(replacement, notifier);
    }
}
