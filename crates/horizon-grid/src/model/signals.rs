//! Notifications emitted by the grid model.

use std::sync::Arc;

use horizon_grid_core::Signal;

use super::column::ColumnId;

/// Signals emitted by a [`GridModel`](super::GridModel).
///
/// Payloads are plain data: counts, deltas, column ids and the caller's own
/// element handles. Nothing refers back into the model's collections.
///
/// # Emission order
///
/// - **Structural changes** end with `model_changed`, preceded by
///   `row_count_changed` and `height_changed` when those changed.
/// - **Sorting** is bracketed by `column_about_to_sort` and `column_sorted`
///   when notification is requested.
/// - **Filter edits** are bracketed by `filters_changing` and
///   `filters_changed`.
/// - While events are suppressed only the element payload signals fire; the
///   aggregate signals fire once when suppression ends.
pub struct GridSignals<T> {
    // -------------------------------------------------------------------------
    // Aggregate change signals
    // -------------------------------------------------------------------------
    /// Emitted after any change to rows, order or visibility.
    pub model_changed: Signal<()>,

    /// Emitted when the selected rows, columns or anchor change.
    pub selection_changed: Signal<()>,

    /// Emitted when the partition sizes change.
    /// Args: (visible rows, hidden rows)
    pub row_count_changed: Signal<(usize, usize)>,

    /// Emitted when the total height of visible rows changes.
    /// Args: signed delta in pixels
    pub height_changed: Signal<i64>,

    // -------------------------------------------------------------------------
    // Element signals
    // -------------------------------------------------------------------------
    /// Emitted after elements gained rows.
    pub elements_added: Signal<Vec<Arc<T>>>,

    /// Emitted after rows were re-evaluated for changed elements.
    pub elements_updated: Signal<Vec<Arc<T>>>,

    /// Emitted after elements lost their rows.
    pub elements_removed: Signal<Vec<Arc<T>>>,

    // -------------------------------------------------------------------------
    // Filter signals
    // -------------------------------------------------------------------------
    /// Emitted before the filter set changes.
    pub filters_changing: Signal<()>,

    /// Emitted after the filter set changed and was re-applied.
    pub filters_changed: Signal<()>,

    // -------------------------------------------------------------------------
    // Column signals
    // -------------------------------------------------------------------------
    /// Emitted after a column moved.
    /// Args: (column, old position, new position)
    pub column_moved: Signal<(ColumnId, usize, usize)>,

    /// Emitted after a column width changed.
    /// Args: (column, new width)
    pub column_resized: Signal<(ColumnId, u32)>,

    /// Emitted before rows are re-sorted for a column.
    pub column_about_to_sort: Signal<ColumnId>,

    /// Emitted after rows were re-sorted for a column.
    pub column_sorted: Signal<ColumnId>,

    /// Emitted after the group-by set changed.
    pub group_by_changed: Signal<Vec<ColumnId>>,

    // -------------------------------------------------------------------------
    // Gutter signals
    // -------------------------------------------------------------------------
    /// Emitted when the row-number gutter is shown or hidden.
    pub row_numbers_visibility_changed: Signal<bool>,

    /// Emitted when the group-selector gutter is shown or hidden.
    pub group_selector_visibility_changed: Signal<bool>,
}

impl<T: Send + Sync + 'static> Default for GridSignals<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> GridSignals<T> {
    /// Creates a new set of grid signals.
    pub fn new() -> Self {
        Self {
            model_changed: Signal::new(),
            selection_changed: Signal::new(),
            row_count_changed: Signal::new(),
            height_changed: Signal::new(),
            elements_added: Signal::new(),
            elements_updated: Signal::new(),
            elements_removed: Signal::new(),
            filters_changing: Signal::new(),
            filters_changed: Signal::new(),
            column_moved: Signal::new(),
            column_resized: Signal::new(),
            column_about_to_sort: Signal::new(),
            column_sorted: Signal::new(),
            group_by_changed: Signal::new(),
            row_numbers_visibility_changed: Signal::new(),
            group_selector_visibility_changed: Signal::new(),
        }
    }

    /// Emits `height_changed` unless the delta is zero.
    pub fn emit_height_delta(&self, delta: i64) {
        if delta != 0 {
            self.height_changed.emit(delta);
        }
    }

    /// Emits an element payload signal unless the payload is empty.
    pub fn emit_elements(signal: &Signal<Vec<Arc<T>>>, elements: Vec<Arc<T>>) {
        if !elements.is_empty() {
            signal.emit(elements);
        }
    }

    /// Blocks or unblocks every signal.
    pub fn set_blocked(&self, blocked: bool) {
        self.model_changed.set_blocked(blocked);
        self.selection_changed.set_blocked(blocked);
        self.row_count_changed.set_blocked(blocked);
        self.height_changed.set_blocked(blocked);
        self.elements_added.set_blocked(blocked);
        self.elements_updated.set_blocked(blocked);
        self.elements_removed.set_blocked(blocked);
        self.filters_changing.set_blocked(blocked);
        self.filters_changed.set_blocked(blocked);
        self.column_moved.set_blocked(blocked);
        self.column_resized.set_blocked(blocked);
        self.column_about_to_sort.set_blocked(blocked);
        self.column_sorted.set_blocked(blocked);
        self.group_by_changed.set_blocked(blocked);
        self.row_numbers_visibility_changed.set_blocked(blocked);
        self.group_selector_visibility_changed.set_blocked(blocked);
    }
}

impl<T> std::fmt::Debug for GridSignals<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSignals")
            .field("model_changed", &self.model_changed)
            .field("selection_changed", &self.selection_changed)
            .field("row_count_changed", &self.row_count_changed)
            .finish_non_exhaustive()
    }
}
