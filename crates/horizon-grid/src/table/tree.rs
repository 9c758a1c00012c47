//! Tree flattening.
//!
//! Produces the pre-order, depth-first, left-to-right listing of rows used as
//! the universe for bulk selection and expansion bookkeeping. Lazy rows are
//! visited but never descended into, even if they carry a children list.

use horizon_grid_core::Cached;

use super::row::Row;

/// A row together with its depth in the tree.
#[derive(Debug, Clone)]
pub struct FlatNode {
    /// The visited row.
    pub row: Row,
    /// Depth, starting at [`FlattenOptions::base_level`].
    pub level: usize,
}

/// Traversal options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Level assigned to root rows.
    pub base_level: usize,
}

impl FlattenOptions {
    /// Options with a custom root level.
    pub fn with_base_level(base_level: usize) -> Self {
        Self { base_level }
    }
}

/// Visit every reachable row in pre-order.
pub fn walk<F>(roots: &[Row], options: FlattenOptions, mut visit: F)
where
    F: FnMut(&Row, usize),
{
    fn walk_level<F: FnMut(&Row, usize)>(rows: &[Row], level: usize, visit: &mut F) {
        for row in rows {
            visit(row, level);
            if row.is_lazy() {
                continue;
            }
            if let Some(children) = row.children() {
                walk_level(children, level + 1, visit);
            }
        }
    }

    walk_level(roots, options.base_level, &mut visit);
}

/// Flatten `roots` into `(row, level)` nodes.
pub fn flatten(roots: &[Row], options: FlattenOptions) -> Vec<FlatNode> {
    let mut nodes = Vec::with_capacity(roots.len());
    walk(roots, options, |row, level| {
        nodes.push(FlatNode {
            row: row.clone(),
            level,
        })
    });
    nodes
}

/// Flatten `roots` into rows only.
pub fn flatten_to_row_list(roots: &[Row], options: FlattenOptions) -> Vec<Row> {
    let mut rows = Vec::with_capacity(roots.len());
    walk(roots, options, |row, _| rows.push(row.clone()));
    rows
}

/// The cached universe of rows that bulk selection operates on.
///
/// In tree-selectable mode this is the flattened data followed by the lazily
/// loaded tree rows; otherwise it is the top-level data as given. Setters
/// on the owning store call [`VisibleRows::invalidate`] whenever one of the
/// three inputs changes.
#[derive(Debug, Default)]
pub struct VisibleRows {
    cache: Cached<Vec<Row>>,
}

impl VisibleRows {
    /// Create an empty, dirty projection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rows, recomputed if an input changed since the last read.
    pub fn get(&mut self, data: &[Row], lazy_tree_data: &[Row], expand_selectable: bool) -> &[Row] {
        self.cache.get_or_compute(|| {
            tracing::trace!(
                target: crate::logging::targets::TREE,
                roots = data.len(),
                expand_selectable,
                "recomputing visible rows"
            );
            if expand_selectable {
                let mut rows = flatten_to_row_list(data, FlattenOptions::default());
                rows.extend(lazy_tree_data.iter().cloned());
                rows
            } else {
                data.to_vec()
            }
        })
    }

    /// Mark the projection stale.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// How many times the projection has been rebuilt.
    pub fn recomputations(&self) -> u64 {
        self.cache.computations()
    }
}
