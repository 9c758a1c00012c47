//! Logging targets for the table store.
//!
//! The core plumbing logs under `horizon_grid_core::*`
//! ([`horizon_grid_core::logging::targets`]); the table components log
//! under the targets below.

/// Target names for log filtering.
pub mod targets {
    /// Table store coordinator target.
    pub const STORE: &str = "horizon_grid::store";
    /// Row selection target.
    pub const SELECTION: &str = "horizon_grid::selection";
    /// Row expansion target.
    pub const EXPANSION: &str = "horizon_grid::expansion";
    /// Tree state and flattening target.
    pub const TREE: &str = "horizon_grid::tree";
    /// Column normalization target.
    pub const COLUMNS: &str = "horizon_grid::columns";
}
