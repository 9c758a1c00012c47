//! Change notification boundary between the store and its host.

use horizon_grid_core::Signal;

use super::row::Row;

/// A change published to the host component.
#[derive(Debug, Clone)]
pub enum TableEvent {
    /// The selection set changed, or was cleared from non-empty.
    SelectionChange {
        /// The new selection.
        selection: Vec<Row>,
    },
    /// A single row was toggled through the direct API.
    Select {
        /// The new selection.
        selection: Vec<Row>,
        /// The toggled row.
        row: Row,
    },
    /// The select-all toggle ran, whether or not anything changed.
    SelectAll {
        /// The resulting selection.
        selection: Vec<Row>,
    },
    /// A detail row was expanded or collapsed.
    ExpandChange {
        /// The toggled row.
        row: Row,
        /// The new expansion list.
        expanded_rows: Vec<Row>,
    },
    /// A tree node was expanded or collapsed.
    TreeExpandChange {
        /// The toggled row.
        row: Row,
        /// Whether it is now expanded.
        expanded: bool,
    },
    /// The current (highlighted) row changed.
    CurrentChange {
        /// The new current row.
        current: Option<Row>,
        /// The previous current row.
        previous: Option<Row>,
    },
}

impl TableEvent {
    /// The event name as seen by the host.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectionChange { .. } => "selection-change",
            Self::Select { .. } => "select",
            Self::SelectAll { .. } => "select-all",
            Self::ExpandChange { .. } | Self::TreeExpandChange { .. } => "expand-change",
            Self::CurrentChange { .. } => "current-change",
        }
    }
}

/// Signals the store emits.
///
/// The host connects to [`events`](Self::events) for named change events and
/// to [`layout_requested`](Self::layout_requested) for relayout triggers. The
/// relayout itself, and any debouncing of it, belongs to the host.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    /// Named change events.
    pub events: Signal<TableEvent>,
    /// Relayout requests. Redundant requests are expected.
    pub layout_requested: Signal<()>,
}

static_assertions::assert_impl_all!(ChangeNotifier: Send, Sync);

impl ChangeNotifier {
    /// Create a notifier with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event.
    pub fn emit(&self, event: TableEvent) {
        tracing::trace!(
            target: crate::logging::targets::STORE,
            event = event.name(),
            "emitting table event"
        );
        self.events.emit(event);
    }

    /// Ask the host to relayout.
    pub fn schedule_layout(&self) {
        self.layout_requested.emit(());
    }

    /// Drop every listener.
    pub fn disconnect_all(&self) {
        self.events.disconnect_all();
        self.layout_requested.disconnect_all();
    }
}
