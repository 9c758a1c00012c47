//! Tree-node expansion state.
//!
//! Tree nodes are rows with loaded children or a lazy marker. Their expanded
//! flags are kept per identity, so they survive data refreshes that replace
//! row handles. Tracking requires a row key.

use std::collections::{HashMap, HashSet};

use super::identity::RowKey;
use super::notifier::{ChangeNotifier, TableEvent};
use super::row::{Row, RowId};
use super::tree::{walk, FlattenOptions};
use crate::error::{Result, TableError};
use crate::logging::targets;

/// Per-identity expanded flags for tree nodes.
#[derive(Debug, Default)]
pub struct TreeState {
    nodes: HashMap<RowId, bool>,
    expand_row_keys: HashSet<RowId>,
}

impl TreeState {
    /// No known nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the node for `row` is expanded.
    pub fn is_tree_expanded(&self, row: &Row, key: Option<&RowKey>) -> bool {
        key.and_then(|key| key.resolve(row))
            .is_some_and(|id| self.nodes.get(&id).copied().unwrap_or(false))
    }

    /// Identities of expanded nodes, in no particular order.
    pub fn expanded_keys(&self) -> impl Iterator<Item = &RowId> {
        self.nodes
            .iter()
            .filter_map(|(id, expanded)| expanded.then_some(id))
    }

    /// Number of tracked tree nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Toggle, or force, a node's expansion.
    ///
    /// On change emits a tree `expand-change` and requests a relayout. A row
    /// without an identity is ignored. Fails without a row key.
    pub fn toggle_tree_expansion(
        &mut self,
        row: &Row,
        desired: Option<bool>,
        key: Option<&RowKey>,
        notifier: &ChangeNotifier,
    ) -> Result<bool> {
        let key = key.ok_or(TableError::missing_row_key("toggle_tree_expansion"))?;
        let Some(id) = key.resolve(row) else {
            tracing::trace!(target: targets::TREE, "tree toggle ignored for row without identity");
            return Ok(false);
        };

        let current = self.nodes.get(&id).copied().unwrap_or(false);
        let expanded = desired.unwrap_or(!current);
        self.nodes.insert(id, expanded);
        if expanded == current {
            return Ok(false);
        }

        tracing::debug!(target: targets::TREE, expanded, "tree node toggled");
        notifier.emit(TableEvent::TreeExpandChange {
            row: row.clone(),
            expanded,
        });
        notifier.schedule_layout();
        Ok(true)
    }

    /// Expand exactly the nodes listed in `keys`, now and for nodes that
    /// appear later. Emits nothing.
    pub fn update_tree_expand_keys(
        &mut self,
        keys: &[RowId],
        data: &[Row],
        lazy_tree_data: &[Row],
        key: Option<&RowKey>,
    ) -> Result<()> {
        let key = key.ok_or(TableError::missing_row_key("update_tree_expand_keys"))?;
        self.expand_row_keys = keys.iter().cloned().collect();
        self.nodes.clear();
        self.collect_nodes(data, lazy_tree_data, key, |id| keys.contains(id));
        tracing::debug!(
            target: targets::TREE,
            nodes = self.nodes.len(),
            keys = keys.len(),
            "tree expand keys applied"
        );
        Ok(())
    }

    /// Re-derive node state after a data change.
    ///
    /// Nodes that vanished are dropped. Known nodes keep their flag; new
    /// nodes start expanded when `default_expand_all` is set or their
    /// identity is among the expand keys. Without a row key nothing is
    /// tracked.
    pub fn reconcile(
        &mut self,
        data: &[Row],
        lazy_tree_data: &[Row],
        key: Option<&RowKey>,
        default_expand_all: bool,
    ) {
        let Some(key) = key else {
            self.nodes.clear();
            return;
        };

        let previous = std::mem::take(&mut self.nodes);
        let expand_row_keys = std::mem::take(&mut self.expand_row_keys);
        self.collect_nodes(data, lazy_tree_data, key, |id| {
            previous
                .get(id)
                .copied()
                .unwrap_or(default_expand_all || expand_row_keys.contains(id))
        });
        self.expand_row_keys = expand_row_keys;

        tracing::trace!(
            target: targets::TREE,
            before = previous.len(),
            after = self.nodes.len(),
            "tree state reconciled"
        );
    }

    fn collect_nodes<F>(&mut self, data: &[Row], lazy_tree_data: &[Row], key: &RowKey, mut expanded: F)
    where
        F: FnMut(&RowId) -> bool,
    {
        let nodes = &mut self.nodes;
        let mut visit = |row: &Row, _level: usize| {
            if !(row.is_lazy() || row.children().is_some()) {
                return;
            }
            if let Some(id) = key.resolve(row) {
                let flag = expanded(&id);
                nodes.insert(id, flag);
            }
        };
        walk(data, FlattenOptions::default(), &mut visit);
        walk(lazy_tree_data, FlattenOptions::default(), &mut visit);
    }
}
