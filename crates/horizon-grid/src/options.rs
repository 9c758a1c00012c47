//! Table store configuration.
//!
//! [`TableOptions`] carries the host-supplied switches that shape selection,
//! expansion and tree behavior. It can be built in code or loaded from TOML
//! or JSON:
//!
//! ```
//! use horizon_grid::TableOptions;
//!
//! let options = TableOptions::from_toml_str(r#"
//!     rowKey = "meta.id"
//!     reserveSelection = true
//!     toggleAllDelayMs = 25
//!
//!     [treeProps]
//!     children = "items"
//! "#).unwrap();
//!
//! assert_eq!(options.row_key.as_deref(), Some("meta.id"));
//! assert_eq!(options.tree_props.children, "items");
//! assert_eq!(options.tree_props.has_children, "hasChildren");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default coalescing window for the select-all toggle.
pub const DEFAULT_TOGGLE_ALL_DELAY_MS: u64 = 10;

/// Field names used to read tree structure out of JSON rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeProps {
    /// Field holding the child row array.
    pub children: String,
    /// Field marking a row whose children are not loaded yet.
    pub has_children: String,
}

impl Default for TreeProps {
    fn default() -> Self {
        Self {
            children: "children".to_string(),
            has_children: "hasChildren".to_string(),
        }
    }
}

/// Options for a [`TableStore`](crate::TableStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOptions {
    /// Dotted field path used as the row key. Function keys are set on the
    /// store directly.
    pub row_key: Option<String>,
    /// Keep selected rows across data replacement by re-resolving keys.
    pub reserve_selection: bool,
    /// When some rows are selected, the header checkbox selects the rest
    /// instead of clearing.
    pub select_on_indeterminate: bool,
    /// Expand every row whenever data is replaced.
    pub default_expand_all: bool,
    /// Use the flattened tree (plus lazily loaded rows) as the universe for
    /// selection instead of the top-level rows.
    pub expand_selectable: bool,
    /// Field names for tree structure in JSON rows.
    pub tree_props: TreeProps,
    /// Coalescing window of the select-all toggle, in milliseconds.
    pub toggle_all_delay_ms: u64,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            row_key: None,
            reserve_selection: false,
            select_on_indeterminate: false,
            default_expand_all: false,
            expand_selectable: false,
            tree_props: TreeProps::default(),
            toggle_all_delay_ms: DEFAULT_TOGGLE_ALL_DELAY_MS,
        }
    }
}

impl TableOptions {
    /// Parse options from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parse options from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Set the row key field path.
    pub fn with_row_key(mut self, path: impl Into<String>) -> Self {
        self.row_key = Some(path.into());
        self
    }

    /// Set whether selection survives data replacement.
    pub fn with_reserve_selection(mut self, reserve: bool) -> Self {
        self.reserve_selection = reserve;
        self
    }

    /// Set the header checkbox behavior for partial selections.
    pub fn with_select_on_indeterminate(mut self, enabled: bool) -> Self {
        self.select_on_indeterminate = enabled;
        self
    }

    /// Set whether all rows start expanded.
    pub fn with_default_expand_all(mut self, enabled: bool) -> Self {
        self.default_expand_all = enabled;
        self
    }

    /// Set whether nested rows take part in selection.
    pub fn with_expand_selectable(mut self, enabled: bool) -> Self {
        self.expand_selectable = enabled;
        self
    }

    /// Set the tree field names.
    pub fn with_tree_props(mut self, props: TreeProps) -> Self {
        self.tree_props = props;
        self
    }

    /// Set the select-all coalescing window.
    pub fn with_toggle_all_delay(mut self, delay: Duration) -> Self {
        self.toggle_all_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// The select-all coalescing window.
    pub fn toggle_all_delay(&self) -> Duration {
        Duration::from_millis(self.toggle_all_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = TableOptions::default();
        assert!(options.row_key.is_none());
        assert!(!options.reserve_selection);
        assert_eq!(options.toggle_all_delay(), Duration::from_millis(10));
        assert_eq!(options.tree_props, TreeProps::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(TableOptions::from_toml_str("").unwrap(), TableOptions::default());
    }

    #[test]
    fn test_json_options() {
        let options = TableOptions::from_json_str(
            r#"{"rowKey": "id", "selectOnIndeterminate": true, "defaultExpandAll": true}"#,
        )
        .unwrap();
        assert_eq!(options.row_key.as_deref(), Some("id"));
        assert!(options.select_on_indeterminate);
        assert!(options.default_expand_all);
        assert!(!options.expand_selectable);
    }

    #[test]
    fn test_bad_toml_reports_config_error() {
        let err = TableOptions::from_toml_str("rowKey = 5").unwrap_err();
        assert!(matches!(err, crate::TableError::Config(_)));
    }

    #[test]
    fn test_builder() {
        let options = TableOptions::default()
            .with_row_key("id")
            .with_reserve_selection(true)
            .with_toggle_all_delay(Duration::from_millis(40));
        assert_eq!(options.row_key.as_deref(), Some("id"));
        assert!(options.reserve_selection);
        assert_eq!(options.toggle_all_delay_ms, 40);
    }
}
