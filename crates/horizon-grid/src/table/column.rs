//! Column configuration and normalization.
//!
//! Raw column configuration is a forest: a column may group sub-columns
//! under a multi-level header. [`normalize`] splits the top level into
//! left-fixed, center and right-fixed groups and derives the leaf columns
//! that are actually rendered, in display order.

use serde::{Deserialize, Serialize};

use super::dimension::{parse_min_width, parse_width, Dimension};

/// Which edge, if any, a column is pinned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFixed", into = "RawFixed")]
pub enum FixedSide {
    /// Scrolls with the table body.
    #[default]
    None,
    /// Pinned to the left edge (`true` or `"left"` in configuration).
    Left,
    /// Pinned to the right edge (`"right"` in configuration).
    Right,
}

impl FixedSide {
    /// Whether the column is pinned to either edge.
    pub fn is_fixed(self) -> bool {
        self != Self::None
    }
}

/// Wire form of [`FixedSide`]: a flag or a side name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawFixed {
    Flag(bool),
    Side(String),
}

impl TryFrom<RawFixed> for FixedSide {
    type Error = String;

    fn try_from(raw: RawFixed) -> Result<Self, Self::Error> {
        match raw {
            RawFixed::Flag(false) => Ok(Self::None),
            RawFixed::Flag(true) => Ok(Self::Left),
            RawFixed::Side(side) => match side.as_str() {
                "" => Ok(Self::None),
                "left" => Ok(Self::Left),
                "right" => Ok(Self::Right),
                other => Err(format!("unknown fixed side '{other}'")),
            },
        }
    }
}

impl From<FixedSide> for RawFixed {
    fn from(side: FixedSide) -> Self {
        match side {
            FixedSide::None => Self::Flag(false),
            FixedSide::Left => Self::Side("left".to_string()),
            FixedSide::Right => Self::Side("right".to_string()),
        }
    }
}

/// The role of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// An ordinary data column.
    #[default]
    Default,
    /// The row selection checkbox column.
    Selection,
    /// The row detail expander column.
    Expand,
    /// A running row number column.
    Index,
}

/// One column configuration entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    /// Unique column id.
    pub id: String,
    /// Optional user-facing key used for lookups.
    pub column_key: Option<String>,
    /// Header label.
    pub label: Option<String>,
    /// Column role.
    #[serde(rename = "type")]
    pub kind: ColumnKind,
    /// Pinning.
    pub fixed: FixedSide,
    /// Configured width.
    pub width: Option<Dimension>,
    /// Configured minimum width.
    pub min_width: Option<Dimension>,
    /// Sub-columns of a grouping header.
    pub children: Vec<Column>,
}

impl Column {
    /// An ordinary column.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// A selection checkbox column.
    pub fn selection(id: impl Into<String>) -> Self {
        Self::new(id).with_kind(ColumnKind::Selection)
    }

    /// A detail expander column.
    pub fn expand(id: impl Into<String>) -> Self {
        Self::new(id).with_kind(ColumnKind::Expand)
    }

    /// Set the role.
    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the pinning.
    pub fn with_fixed(mut self, fixed: FixedSide) -> Self {
        self.fixed = fixed;
        self
    }

    /// Set the lookup key.
    pub fn with_column_key(mut self, key: impl Into<String>) -> Self {
        self.column_key = Some(key.into());
        self
    }

    /// Set the width.
    pub fn with_width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set the sub-columns.
    pub fn with_children(mut self, children: Vec<Column>) -> Self {
        self.children = children;
        self
    }

    /// Whether this column is rendered (has no sub-columns).
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Width in pixels, if configured and parsable.
    pub fn resolved_width(&self) -> Option<u32> {
        parse_width(self.width.as_ref())
    }

    /// Minimum width in pixels, if configured.
    pub fn resolved_min_width(&self) -> Option<u32> {
        parse_min_width(self.min_width.as_ref())
    }
}

/// Everything derived from the raw column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnLayout {
    fixed_columns: Vec<Column>,
    right_fixed_columns: Vec<Column>,
    not_fixed_columns: Vec<Column>,
    origin_columns: Vec<Column>,
    columns: Vec<Column>,
    leaf_columns: Vec<Column>,
    fixed_leaf_columns: Vec<Column>,
    right_fixed_leaf_columns: Vec<Column>,
    is_complex: bool,
}

impl ColumnLayout {
    /// Top-level left-fixed columns.
    pub fn fixed_columns(&self) -> &[Column] {
        &self.fixed_columns
    }

    /// Top-level right-fixed columns.
    pub fn right_fixed_columns(&self) -> &[Column] {
        &self.right_fixed_columns
    }

    /// Top-level unpinned columns.
    pub fn not_fixed_columns(&self) -> &[Column] {
        &self.not_fixed_columns
    }

    /// Top-level columns in display order: left, center, right.
    pub fn origin_columns(&self) -> &[Column] {
        &self.origin_columns
    }

    /// Rendered leaf columns in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Center leaf columns.
    pub fn leaf_columns(&self) -> &[Column] {
        &self.leaf_columns
    }

    /// Left-fixed leaf columns.
    pub fn fixed_leaf_columns(&self) -> &[Column] {
        &self.fixed_leaf_columns
    }

    /// Right-fixed leaf columns.
    pub fn right_fixed_leaf_columns(&self) -> &[Column] {
        &self.right_fixed_leaf_columns
    }

    /// Number of rendered columns.
    pub fn leaf_columns_len(&self) -> usize {
        self.leaf_columns.len()
    }

    /// Number of left-fixed rendered columns.
    pub fn fixed_leaf_columns_len(&self) -> usize {
        self.fixed_leaf_columns.len()
    }

    /// Number of right-fixed rendered columns.
    pub fn right_fixed_leaf_columns_len(&self) -> usize {
        self.right_fixed_leaf_columns.len()
    }

    /// Whether any column is pinned.
    pub fn is_complex(&self) -> bool {
        self.is_complex
    }

    /// Whether a detail expander column is rendered.
    pub fn has_expand_column(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ColumnKind::Expand)
    }

    /// Find a rendered column by id. The last match wins.
    pub fn column_by_id(&self, id: &str) -> Option<&Column> {
        self.columns.iter().rev().find(|c| c.id == id)
    }

    /// Find a rendered column by its lookup key. The first match wins.
    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.column_key.as_deref() == Some(key))
    }
}

/// Derive the column layout from the raw column list.
///
/// If any column is left-fixed and the first raw column is an unpinned
/// selection column, that column is pinned left in `raw` as well and heads
/// the left group.
#[tracing::instrument(skip_all, target = "horizon_grid::columns", level = "trace")]
pub fn normalize(raw: &mut [Column]) -> ColumnLayout {
    let mut fixed_columns: Vec<Column> = raw
        .iter()
        .filter(|c| c.fixed == FixedSide::Left)
        .cloned()
        .collect();
    let right_fixed_columns: Vec<Column> = raw
        .iter()
        .filter(|c| c.fixed == FixedSide::Right)
        .cloned()
        .collect();

    if !fixed_columns.is_empty() {
        if let Some(first) = raw.first_mut() {
            if first.kind == ColumnKind::Selection && !first.fixed.is_fixed() {
                first.fixed = FixedSide::Left;
                fixed_columns.insert(0, first.clone());
            }
        }
    }

    let not_fixed_columns: Vec<Column> = raw
        .iter()
        .filter(|c| !c.fixed.is_fixed())
        .cloned()
        .collect();

    let origin_columns: Vec<Column> = fixed_columns
        .iter()
        .chain(&not_fixed_columns)
        .chain(&right_fixed_columns)
        .cloned()
        .collect();

    let leaf_columns = flatten_leaves(&not_fixed_columns);
    let fixed_leaf_columns = flatten_leaves(&fixed_columns);
    let right_fixed_leaf_columns = flatten_leaves(&right_fixed_columns);

    let columns: Vec<Column> = fixed_leaf_columns
        .iter()
        .chain(&leaf_columns)
        .chain(&right_fixed_leaf_columns)
        .cloned()
        .collect();

    let is_complex = !fixed_columns.is_empty() || !right_fixed_columns.is_empty();

    tracing::debug!(
        target: crate::logging::targets::COLUMNS,
        fixed = fixed_leaf_columns.len(),
        center = leaf_columns.len(),
        right_fixed = right_fixed_leaf_columns.len(),
        is_complex,
        "columns normalized"
    );

    ColumnLayout {
        fixed_columns,
        right_fixed_columns,
        not_fixed_columns,
        origin_columns,
        columns,
        leaf_columns,
        fixed_leaf_columns,
        right_fixed_leaf_columns,
        is_complex,
    }
}

/// Depth-first list of leaf columns.
fn flatten_leaves(columns: &[Column]) -> Vec<Column> {
    fn collect(columns: &[Column], out: &mut Vec<Column>) {
        for column in columns {
            if column.is_leaf() {
                out.push(column.clone());
            } else {
                collect(&column.children, out);
            }
        }
    }

    let mut out = Vec::new();
    collect(columns, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(columns: &[Column]) -> Vec<&str> {
        columns.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_selection_column_forced_left() {
        let mut raw = vec![
            Column::selection("selection"),
            Column::new("a"),
            Column::new("b").with_fixed(FixedSide::Right),
            Column::new("c").with_fixed(FixedSide::Left),
        ];
        let layout = normalize(&mut raw);

        assert_eq!(ids(layout.fixed_columns()), vec!["selection", "c"]);
        assert_eq!(ids(layout.right_fixed_columns()), vec!["b"]);
        assert_eq!(ids(layout.leaf_columns()), vec!["a"]);
        assert_eq!(ids(layout.columns()), vec!["selection", "c", "a", "b"]);
        assert_eq!(ids(layout.origin_columns()), vec!["selection", "c", "a", "b"]);
        assert!(layout.is_complex());
        assert_eq!(raw[0].fixed, FixedSide::Left);
        assert_eq!(layout.fixed_columns()[0].fixed, FixedSide::Left);
    }

    #[test]
    fn test_selection_column_not_forced_without_left_group() {
        let mut raw = vec![
            Column::selection("selection"),
            Column::new("a"),
            Column::new("b").with_fixed(FixedSide::Right),
        ];
        let layout = normalize(&mut raw);

        assert!(layout.fixed_columns().is_empty());
        assert_eq!(ids(layout.columns()), vec!["selection", "a", "b"]);
        assert_eq!(raw[0].fixed, FixedSide::None);
        assert!(layout.is_complex());
    }

    #[test]
    fn test_no_fixed_columns() {
        let mut raw = vec![Column::new("a"), Column::new("b")];
        let layout = normalize(&mut raw);
        assert!(!layout.is_complex());
        assert_eq!(layout.leaf_columns_len(), 2);
        assert_eq!(layout.fixed_leaf_columns_len(), 0);
        assert_eq!(layout.right_fixed_leaf_columns_len(), 0);
    }

    #[test]
    fn test_multi_level_headers_flatten_to_leaves() {
        let mut raw = vec![
            Column::new("name"),
            Column::new("address").with_children(vec![
                Column::new("city"),
                Column::new("street").with_children(vec![Column::new("line1"), Column::new("line2")]),
            ]),
            Column::new("ops")
                .with_fixed(FixedSide::Right)
                .with_children(vec![Column::new("edit"), Column::new("delete")]),
        ];
        let layout = normalize(&mut raw);

        assert_eq!(ids(layout.origin_columns()), vec!["name", "address", "ops"]);
        assert_eq!(ids(layout.leaf_columns()), vec!["name", "city", "line1", "line2"]);
        assert_eq!(ids(layout.right_fixed_leaf_columns()), vec!["edit", "delete"]);
        assert_eq!(layout.right_fixed_leaf_columns_len(), 2);
        assert_eq!(
            ids(layout.columns()),
            vec!["name", "city", "line1", "line2", "edit", "delete"]
        );
    }

    #[test]
    fn test_column_lookup() {
        let mut raw = vec![
            Column::new("a").with_column_key("alpha"),
            Column::expand("x"),
        ];
        let layout = normalize(&mut raw);

        assert_eq!(layout.column_by_key("alpha").map(|c| c.id.as_str()), Some("a"));
        assert!(layout.column_by_key("beta").is_none());
        assert_eq!(layout.column_by_id("x").map(|c| c.kind), Some(ColumnKind::Expand));
        assert!(layout.has_expand_column());
    }

    #[test]
    fn test_deserialize_fixed_variants() {
        let raw: Vec<Column> = serde_json::from_str(
            r#"[
                {"id": "a", "fixed": true},
                {"id": "b", "fixed": "left"},
                {"id": "c", "fixed": "right"},
                {"id": "d", "fixed": false},
                {"id": "e"},
                {"id": "f", "type": "selection", "width": "48px"}
            ]"#,
        )
        .unwrap();

        let sides: Vec<FixedSide> = raw.iter().map(|c| c.fixed).collect();
        assert_eq!(
            sides,
            vec![
                FixedSide::Left,
                FixedSide::Left,
                FixedSide::Right,
                FixedSide::None,
                FixedSide::None,
                FixedSide::None
            ]
        );
        assert_eq!(raw[5].kind, ColumnKind::Selection);
        assert_eq!(raw[5].resolved_width(), Some(48));
    }

    #[test]
    fn test_unknown_fixed_side_is_rejected() {
        let result: Result<Column, _> = serde_json::from_str(r#"{"id": "a", "fixed": "middle"}"#);
        assert!(result.is_err());
    }
}
