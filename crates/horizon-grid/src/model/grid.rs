//! The grid model.
//!
//! [`GridModel`] owns every row and column, composes the sort, filter,
//! selection and viewport state, and is the only way to mutate any of it.
//! Every public operation leaves the model consistent:
//!
//! - each element with a row appears exactly once in the identity map and in
//!   exactly one of the visible and hidden partitions;
//! - the visible sequence is ordered by the current [`RowComparator`], so
//!   inserts use a binary search instead of a full re-sort;
//! - with group consistency enabled, a group parent is selected exactly when
//!   its visible leaf rows are.
//!
//! # Batching
//!
//! Structural operations end with one reindex and one round of aggregate
//! signals. Wrap larger edits in [`GridModel::suppress_events`] (or balanced
//! [`GridModel::enable_events`] calls) to collapse them into a single round.
//!
//! ```ignore
//! let mut grid = GridModel::new(content, labels, GridConfig::default());
//! grid.add_columns([Column::new("name", "Name")])?;
//! {
//!     let mut batch = grid.suppress_events();
//!     batch.add_elements(first_page);
//!     batch.add_elements(second_page);
//! } // one reindex, one model_changed
//! ```

use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use horizon_grid_core::logging::targets;
use horizon_grid_core::{LogOnce, PerfSpan};

use super::column::{Column, ColumnId, ColumnSet};
use super::debug::GridDebug;
use super::filter::{Filter, FilterId, FilterModel};
use super::hierarchy::{ancestors, is_parent_element, whole_group, Hierarchy};
use super::provider::{ContentProvider, DefaultRowFactory, LabelProvider, RowFactory};
use super::row::{ElementKey, Row, RowId, RowTable};
use super::selection::{RangeTarget, SelectionModel, SelectionStyle};
use super::signals::GridSignals;
use super::sort::{GroupSortPolicy, RowComparator, SortModel};
use super::value::CellValue;
use crate::config::GridConfig;
use crate::error::{GridError, GridResult};
use crate::viewport::{CellRange, ColumnHit, LayoutSource, Point, Rect, RowHit, Size, Viewport};

/// Borrows the layout-relevant fields of a model as a [`LayoutSource`].
///
/// A macro rather than a method so the viewport can be borrowed mutably
/// alongside it.
macro_rules! layout {
    ($model:expr) => {
        GridLayout {
            rows: &$model.rows,
            columns: &$model.columns,
            config: &$model.config,
            labels: &*$model.labels,
            header: $model.header_materialized,
        }
    };
}

/// Keyboard navigation commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Previous visible row.
    Up,
    /// Next visible row.
    Down,
    /// Previous visible column.
    Left,
    /// Next visible column.
    Right,
    /// One page of rows up.
    PageUp,
    /// One page of rows down.
    PageDown,
    /// First visible column.
    Home,
    /// Last visible column.
    End,
    /// First visible row.
    FirstRow,
    /// Last visible row.
    LastRow,
}

impl Navigation {
    fn is_vertical(self) -> bool {
        matches!(
            self,
            Navigation::Up
                | Navigation::Down
                | Navigation::PageUp
                | Navigation::PageDown
                | Navigation::FirstRow
                | Navigation::LastRow
        )
    }
}

/// Partition sizes and visible height, compared before and after an
/// operation to decide which aggregate signals fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Counts {
    visible: usize,
    hidden: usize,
    height: i64,
}

/// The orchestrating row/column model of a grid.
pub struct GridModel<T> {
    content: Arc<dyn ContentProvider<T>>,
    labels: Arc<dyn LabelProvider<T>>,
    factory: Arc<dyn RowFactory<T>>,
    config: GridConfig,
    columns: ColumnSet,
    rows: RowTable<T>,
    pinned_rows: Vec<RowId>,
    sort: SortModel,
    filters: FilterModel<T>,
    selection: SelectionModel,
    viewport: Viewport,
    signals: GridSignals<T>,
    header_materialized: bool,
    suppress_depth: usize,
    suppressed_from: Option<Counts>,
    selection_pending: bool,
    warnings: LogOnce,
}

impl<T: Send + Sync + 'static> GridModel<T> {
    /// Creates an empty model.
    pub fn new(
        content: Arc<dyn ContentProvider<T>>,
        labels: Arc<dyn LabelProvider<T>>,
        config: GridConfig,
    ) -> Self {
        tracing::debug!(target: targets::MODEL, ?config, "creating grid model");
        Self {
            content,
            labels,
            factory: Arc::new(DefaultRowFactory),
            columns: ColumnSet::new(),
            rows: RowTable::new(),
            pinned_rows: Vec::new(),
            sort: SortModel::new(),
            filters: FilterModel::new(config.hide_none_highlighted_rows),
            selection: SelectionModel::new(
                config.selection_style,
                config.group_selection_consistency,
            ),
            viewport: Viewport::new(),
            signals: GridSignals::new(),
            header_materialized: false,
            suppress_depth: 0,
            suppressed_from: None,
            selection_pending: false,
            warnings: LogOnce::new(),
            config,
        }
    }

    /// Replaces the row factory used for newly added elements.
    pub fn with_row_factory(mut self, factory: Arc<dyn RowFactory<T>>) -> Self {
        self.factory = factory;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The configuration in effect.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The content provider.
    pub fn content(&self) -> &dyn ContentProvider<T> {
        &*self.content
    }

    /// The label provider.
    pub fn labels(&self) -> &dyn LabelProvider<T> {
        &*self.labels
    }

    /// Signals emitted by this model.
    pub fn signals(&self) -> &GridSignals<T> {
        &self.signals
    }

    /// Every column plus the visible layout.
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Looks up a column.
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    /// The row table.
    pub fn rows(&self) -> &RowTable<T> {
        &self.rows
    }

    /// Looks up a row.
    pub fn row(&self, id: RowId) -> Option<&Row<T>> {
        self.rows.get(id)
    }

    /// The row wrapping `element`.
    pub fn row_of(&self, element: &T) -> Option<RowId> {
        self.rows.row_of(element)
    }

    /// The element wrapped by `id`.
    pub fn element(&self, id: RowId) -> Option<&Arc<T>> {
        self.rows.element(id)
    }

    /// Visible rows in display order.
    pub fn visible_rows(&self) -> &[RowId] {
        self.rows.visible()
    }

    /// Rows hidden by filters.
    pub fn hidden_rows(&self) -> &[RowId] {
        self.rows.hidden()
    }

    /// Number of visible rows.
    pub fn visible_row_count(&self) -> usize {
        self.rows.visible().len()
    }

    /// Number of rows, visible or not.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Sum of the heights of the visible rows.
    pub fn visible_height(&self) -> i64 {
        self.rows.visible_height()
    }

    /// Pinned rows in pin order.
    pub fn pinned_rows(&self) -> &[RowId] {
        &self.pinned_rows
    }

    /// The sort model.
    pub fn sort_model(&self) -> &SortModel {
        &self.sort
    }

    /// The filter pipeline.
    pub fn filters(&self) -> &FilterModel<T> {
        &self.filters
    }

    /// The selection state.
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// The viewport state.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Returns `true` once the header row exists, which happens when the
    /// first columns are added.
    pub fn has_header_row(&self) -> bool {
        self.header_materialized
    }

    /// Group relations over the current rows.
    pub fn hierarchy(&self) -> Hierarchy<'_, T> {
        Hierarchy::new(&self.rows, &*self.content)
    }

    /// Comparator under the current sort configuration.
    pub fn row_comparator(&self) -> RowComparator<'_, T> {
        Self::comparator(&*self.content, &self.sort, &self.columns, &self.config)
    }

    /// Raw value of a cell.
    pub fn cell_value(&self, row: RowId, column: &ColumnId) -> Option<CellValue> {
        let element = self.rows.element(row)?;
        let column = self.columns.get(column)?;
        Some(self.content.value(column, element))
    }

    /// Display text of a cell.
    pub fn cell_text(&self, row: RowId, column: &ColumnId) -> Option<String> {
        let element = self.rows.element(row)?;
        let column = self.columns.get(column)?;
        Some(self.labels.text(column, element))
    }

    /// A printable dump of the visible rows.
    pub fn debug(&self) -> GridDebug<'_, T> {
        GridDebug::new(self)
    }

    // =========================================================================
    // Group helpers
    // =========================================================================

    /// Returns `true` if the row's element is a group parent.
    pub fn is_parent_row(&self, id: RowId) -> bool {
        self.hierarchy().is_parent_row(id)
    }

    /// Returns `true` if `element` has a parent.
    pub fn is_child_element(&self, element: &T) -> bool {
        self.content.parent(element).is_some()
    }

    /// Returns `true` if both rows belong to the same group.
    pub fn is_same_group(&self, a: RowId, b: RowId) -> bool {
        self.hierarchy().is_same_group(a, b)
    }

    /// Rows of the whole group containing `id`, group parent first.
    pub fn whole_group(&self, id: RowId) -> Vec<RowId> {
        self.hierarchy().whole_group(id)
    }

    /// Rows of the immediate children of `id`.
    pub fn children(&self, id: RowId) -> Vec<RowId> {
        self.hierarchy().children(id)
    }

    /// Rows of all descendants of `id`.
    pub fn all_children(&self, id: RowId) -> Vec<RowId> {
        self.hierarchy().all_children(id)
    }

    // =========================================================================
    // Columns
    // =========================================================================

    /// Adds columns.
    ///
    /// Fails without changing anything if any id is already present or
    /// repeated in `columns`. Columns that already carry a sort direction
    /// become active sort columns and the rows are re-sorted silently.
    pub fn add_columns(&mut self, columns: impl IntoIterator<Item = Column>) -> GridResult<()> {
        let columns: Vec<Column> = columns.into_iter().collect();
        let mut seen = HashSet::new();
        for column in &columns {
            if self.columns.contains(column.id()) || !seen.insert(column.id().clone()) {
                tracing::error!(target: targets::MODEL, id = %column.id(), "duplicate column id");
                return Err(GridError::duplicate_column(column.id()));
            }
        }
        if columns.is_empty() {
            return Ok(());
        }

        let ids: Vec<ColumnId> = columns.iter().map(|c| c.id().clone()).collect();
        for column in columns {
            self.columns.push(column);
        }
        self.columns.rebuild_visible();

        let active_before = self.sort.active().len();
        self.sort.adopt_initial(&mut self.columns, &ids);
        if self.sort.active().len() != active_before {
            self.resort();
        }

        if !self.header_materialized {
            self.header_materialized = true;
            tracing::debug!(target: targets::MODEL, "header row materialized");
        }
        tracing::debug!(target: targets::MODEL, count = ids.len(), "added columns");
        self.notify_layout_changed();
        Ok(())
    }

    /// Removes columns from the grid, the sort, the group-by set and the
    /// column selection. Returns `true` if any column was removed.
    pub fn remove_columns(&mut self, ids: &[ColumnId]) -> bool {
        let group_by_before = self.columns.group_by().len();
        let removed = self.columns.remove(ids);
        if removed.is_empty() {
            return false;
        }
        self.columns.rebuild_visible();

        let resort = self.sort.remove(&mut self.columns, ids);
        let mut selection_changed = false;
        for id in ids {
            selection_changed |= self.selection.remove_column(id);
        }
        if resort {
            self.resort();
        }
        if self.columns.group_by().len() != group_by_before {
            self.announce_group_by();
        }

        tracing::debug!(target: targets::MODEL, count = removed.len(), "removed columns");
        self.notify_layout_changed();
        if selection_changed {
            self.notify_selection();
        }
        true
    }

    /// Removes every column.
    pub fn clear_columns(&mut self) -> bool {
        let ids: Vec<ColumnId> = self.columns.all().iter().map(|c| c.id().clone()).collect();
        self.remove_columns(&ids)
    }

    /// Shows or hides a column. Returns `true` if the flag changed.
    pub fn set_column_visible(&mut self, id: &ColumnId, visible: bool) -> GridResult<bool> {
        let column = self
            .columns
            .get_mut(id)
            .ok_or_else(|| GridError::unknown_column(id))?;
        if column.is_visible() == visible {
            return Ok(false);
        }
        column.set_visible(visible);
        self.columns.rebuild_visible();
        if !visible && self.selection.remove_column(id) {
            self.notify_selection();
        }
        self.notify_layout_changed();
        Ok(true)
    }

    /// Pins or unpins a column. Pinned columns lead the layout and do not
    /// scroll horizontally.
    pub fn set_column_pinned(&mut self, id: &ColumnId, pinned: bool) -> GridResult<bool> {
        let column = self
            .columns
            .get_mut(id)
            .ok_or_else(|| GridError::unknown_column(id))?;
        if column.is_pinned() == pinned {
            return Ok(false);
        }
        column.set_pinned(pinned);
        self.columns.rebuild_visible();
        self.notify_layout_changed();
        Ok(true)
    }

    /// Resizes a column.
    pub fn set_column_width(&mut self, id: &ColumnId, width: u32) -> GridResult<bool> {
        let column = self
            .columns
            .get_mut(id)
            .ok_or_else(|| GridError::unknown_column(id))?;
        if column.width() == width {
            return Ok(false);
        }
        column.set_width(width);
        self.viewport.invalidate();
        if !self.is_suppressed() {
            self.signals.column_resized.emit((id.clone(), width));
        }
        Ok(true)
    }

    /// Moves a column to position `to` among all columns.
    pub fn move_column(&mut self, id: &ColumnId, to: usize) -> GridResult<bool> {
        let from = self
            .columns
            .position(id)
            .ok_or_else(|| GridError::unknown_column(id))?;
        let to = to.min(self.columns.all().len().saturating_sub(1));
        if from == to {
            return Ok(false);
        }
        self.columns.move_to(from, to);
        self.columns.rebuild_visible();
        self.viewport.invalidate();
        if !self.is_suppressed() {
            self.signals.column_moved.emit((id.clone(), from, to));
        }
        Ok(true)
    }

    /// Adds columns to the group-by set and hides them.
    ///
    /// Grouping does not re-sort; call [`sort`](Self::sort) to order rows by
    /// the new grouping key.
    pub fn group_by(&mut self, ids: &[ColumnId]) -> GridResult<bool> {
        if let Some(missing) = ids.iter().find(|id| !self.columns.contains(id)) {
            return Err(GridError::unknown_column(missing));
        }
        let mut changed = false;
        for id in ids {
            if self.columns.add_group_by(id) {
                if let Some(column) = self.columns.get_mut(id) {
                    column.set_visible(false);
                }
                changed = true;
            }
        }
        if changed {
            self.columns.rebuild_visible();
            self.announce_group_by();
            self.notify_layout_changed();
        }
        Ok(changed)
    }

    /// Removes columns from the group-by set and shows them again.
    pub fn ungroup_by(&mut self, ids: &[ColumnId]) -> GridResult<bool> {
        if let Some(missing) = ids.iter().find(|id| !self.columns.contains(id)) {
            return Err(GridError::unknown_column(missing));
        }
        let mut changed = false;
        for id in ids {
            if self.columns.remove_group_by(id) {
                if let Some(column) = self.columns.get_mut(id) {
                    column.set_visible(true);
                }
                changed = true;
            }
        }
        if changed {
            self.columns.rebuild_visible();
            self.announce_group_by();
            self.notify_layout_changed();
        }
        Ok(changed)
    }

    /// Empties the group-by set.
    pub fn ungroup_all(&mut self) -> bool {
        let ids = self.columns.take_group_by();
        if ids.is_empty() {
            return false;
        }
        for id in &ids {
            if let Some(column) = self.columns.get_mut(id) {
                column.set_visible(true);
            }
        }
        self.columns.rebuild_visible();
        self.announce_group_by();
        self.notify_layout_changed();
        true
    }

    fn announce_group_by(&mut self) {
        let group_by = self.columns.group_by().to_vec();
        self.content.on_group_by_changed(&group_by);
        tracing::debug!(target: targets::MODEL, ?group_by, "group-by changed");
        if !self.is_suppressed() {
            self.signals.group_by_changed.emit(group_by);
        }
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    /// Sorts by `id`.
    ///
    /// With `toggle` the column cycles `None -> Ascending -> Descending ->
    /// None`; otherwise it keeps its direction. Without `append` every other
    /// sort column is reset. The whole visible sequence is re-sorted and
    /// reindexed. `notify` brackets the sort with `column_about_to_sort` and
    /// `column_sorted`.
    pub fn sort(&mut self, id: &ColumnId, toggle: bool, append: bool, notify: bool) -> GridResult<()> {
        if !self.columns.contains(id) {
            return Err(GridError::unknown_column(id));
        }
        let _span = PerfSpan::new("sort");
        let notify = notify && !self.is_suppressed();
        if notify {
            self.signals.column_about_to_sort.emit(id.clone());
        }
        self.sort.apply(&mut self.columns, id, toggle, append)?;
        tracing::debug!(
            target: targets::SORT,
            column = %id,
            direction = ?self.columns.get(id).map(Column::sort_direction),
            active = self.sort.active().len(),
            "sorting rows"
        );
        self.resort();
        self.viewport.invalidate();
        if notify {
            self.signals.column_sorted.emit(id.clone());
        }
        if !self.is_suppressed() {
            self.signals.model_changed.emit(());
        }
        Ok(())
    }

    /// Insertion index that keeps the visible sequence ordered if the row
    /// were shown now. Meaningful for rows that are not currently visible.
    pub fn sorted_row_index(&self, id: RowId) -> Option<usize> {
        let element = self.rows.element(id)?;
        let comparator = self.row_comparator();
        Some(
            self.rows
                .insertion_index(element, |a, b| comparator.compare(a, b)),
        )
    }

    /// Parent rows above or below their children. Re-sorts.
    pub fn set_parents_above_children(&mut self, above: bool) {
        if self.config.parents_above_children != above {
            self.config.parents_above_children = above;
            self.resort();
            self.notify_layout_changed();
        }
    }

    /// How groups are ordered against ungrouped rows. Re-sorts.
    pub fn set_group_sort_policy(&mut self, policy: GroupSortPolicy) {
        if self.config.group_sort_policy != policy {
            self.config.group_sort_policy = policy;
            self.resort();
            self.notify_layout_changed();
        }
    }

    fn comparator<'a>(
        content: &'a dyn ContentProvider<T>,
        sort: &SortModel,
        columns: &ColumnSet,
        config: &GridConfig,
    ) -> RowComparator<'a, T> {
        RowComparator::new(
            sort.keys(columns),
            content,
            config.parents_above_children,
            config.group_sort_policy,
        )
    }

    /// Re-sorts the visible sequence under the current comparator.
    fn resort(&mut self) {
        let comparator = Self::comparator(&*self.content, &self.sort, &self.columns, &self.config);
        self.rows.sort_visible(|a, b| comparator.compare(a, b));
        if !self.is_suppressed() {
            self.reindex();
        }
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Adds elements and returns the rows that ended up visible.
    ///
    /// Each row is filtered and placed at its sorted position by binary
    /// search. Elements that already have a row are skipped.
    pub fn add_elements<I>(&mut self, elements: I) -> Vec<RowId>
    where
        I: IntoIterator<Item = Arc<T>>,
    {
        let _span = PerfSpan::new("add_elements");
        let before = self.counts();
        let mut added = Vec::new();
        let mut ids = Vec::new();

        for element in elements {
            let Some(id) = self.rows.insert(self.factory.create_row(element.clone())) else {
                let key = self.content.element_id(&element);
                if self.warnings.first(format!("duplicate:{key}")) {
                    tracing::warn!(target: targets::MODEL, element = %key, "element already has a row");
                }
                continue;
            };
            let height = self.height_for(&element);
            self.rows.set_height(id, height);

            let outcome = self.filters.evaluate(&element, &*self.content);
            if let Some(row) = self.rows.get_mut(id) {
                row.set_highlights(outcome.highlights);
            }
            if outcome.visible {
                self.insert_visible(id);
            } else {
                self.rows.place_hidden(id);
            }
            ids.push(id);
            added.push(element);
        }
        if added.is_empty() {
            return Vec::new();
        }

        // Whole-group filters make members depend on each other.
        let mut selection_changed = false;
        let mut affected = ids.clone();
        for id in self.group_rows_of(&added) {
            if self.recheck_row(id, &mut selection_changed) {
                affected.push(id);
            }
        }
        // A new unselected member deselects its group parent.
        selection_changed |= self.repair_selection(&affected);
        self.sync_selection_flags();

        let shown: Vec<RowId> = ids
            .into_iter()
            .filter(|&id| self.rows.get(id).is_some_and(Row::is_visible))
            .collect();
        tracing::debug!(
            target: targets::MODEL,
            added = added.len(),
            shown = shown.len(),
            "added elements"
        );
        GridSignals::emit_elements(&self.signals.elements_added, added);
        self.commit(before);
        if selection_changed {
            self.notify_selection();
        }
        shown
    }

    /// Removes the rows of `elements`. Returns the number of rows removed.
    ///
    /// When the removal empties a row selection and
    /// [`GridConfig::select_next_on_remove`] is set, the row (or whole
    /// group) that followed the last removed visible row is selected.
    pub fn remove_elements(&mut self, elements: &[Arc<T>]) -> usize {
        let before = self.counts();
        let had_selection = self.selection.row_count() > 0;

        let mut doomed = HashSet::new();
        let mut highest: Option<usize> = None;
        let mut removed_visible = 0usize;
        for element in elements {
            let Some(id) = self.rows.row_of(element) else {
                continue;
            };
            if !doomed.insert(id) {
                continue;
            }
            if let Some(position) = self.rows.visible_position(id) {
                highest = Some(highest.map_or(position, |h| h.max(position)));
                removed_visible += 1;
            }
        }
        if doomed.is_empty() {
            return 0;
        }

        let survivors: Vec<RowId> = self
            .group_rows_of(elements)
            .into_iter()
            .filter(|id| !doomed.contains(id))
            .collect();

        let mut selection_changed = false;
        for &id in &doomed {
            selection_changed |= self.selection.remove_row(id);
        }
        self.pinned_rows.retain(|id| !doomed.contains(id));
        let removed: Vec<Arc<T>> = self
            .rows
            .remove_batch(&doomed)
            .iter()
            .map(|row| row.element().clone())
            .collect();

        for &id in &survivors {
            self.recheck_row(id, &mut selection_changed);
        }
        if !survivors.is_empty() {
            selection_changed |= self.repair_selection(&survivors);
        }

        if self.config.select_next_on_remove
            && self.selection.style().is_row_based()
            && had_selection
            && self.selection.row_count() == 0
        {
            if let Some(highest) = highest {
                selection_changed |= self.select_after_removal(highest + 1 - removed_visible);
            }
        }
        self.sync_selection_flags();

        let count = removed.len();
        tracing::debug!(target: targets::MODEL, removed = count, "removed elements");
        GridSignals::emit_elements(&self.signals.elements_removed, removed);
        self.commit(before);
        if selection_changed {
            self.notify_selection();
        }
        count
    }

    /// Re-evaluates the rows of changed elements.
    ///
    /// Heights and filter results are recomputed. A visible row whose sort
    /// position changed is moved; a group parent moves together with its
    /// visible descendants. A row whose visibility changed also re-checks
    /// the rest of its group.
    pub fn update_elements(&mut self, elements: &[Arc<T>]) {
        let before = self.counts();
        let mut updated = Vec::new();
        let mut moved = Vec::new();
        let mut selection_changed = false;

        for element in elements {
            let Some(id) = self.rows.row_of(element) else {
                let key = self.content.element_id(element);
                if self.warnings.first(format!("update-unknown:{key}")) {
                    tracing::warn!(target: targets::MODEL, element = %key, "update for element without a row");
                }
                continue;
            };
            let height = self.height_for(element);
            self.rows.set_height(id, height);

            let outcome = self.filters.evaluate(element, &*self.content);
            let was_visible = self.rows.get(id).is_some_and(Row::is_visible);
            if let Some(row) = self.rows.get_mut(id) {
                row.set_highlights(outcome.highlights);
            }
            match (was_visible, outcome.visible) {
                (false, true) => {
                    if self.show_inner(id) {
                        moved.push(id);
                    }
                }
                (true, false) => {
                    if self.hide_inner(id, &mut selection_changed) {
                        moved.push(id);
                    }
                }
                _ => {}
            }
            // Visible descendants follow their parent's key even while the
            // parent itself is hidden.
            self.reposition(id);
            if was_visible != outcome.visible {
                for related in self.group_rows_of(std::slice::from_ref(element)) {
                    if related != id && self.recheck_row(related, &mut selection_changed) {
                        moved.push(related);
                    }
                }
            }
            updated.push(element.clone());
        }

        if !moved.is_empty() {
            selection_changed |= self.repair_selection(&moved);
        }
        self.sync_selection_flags();
        tracing::trace!(target: targets::MODEL, updated = updated.len(), "updated elements");
        GridSignals::emit_elements(&self.signals.elements_updated, updated);
        self.commit(before);
        if selection_changed {
            self.notify_selection();
        }
    }

    /// Removes every row. Fires a single `model_changed`.
    pub fn clear_elements(&mut self) {
        self.selection.reset();
        self.pinned_rows.clear();
        self.rows.clear();
        self.viewport.invalidate();
        tracing::debug!(target: targets::MODEL, "cleared elements");
        if !self.is_suppressed() {
            self.signals.model_changed.emit(());
        }
    }

    /// Moves a hidden row into the visible sequence at its sorted position.
    pub fn show_row(&mut self, id: RowId) -> bool {
        let before = self.counts();
        if !self.show_inner(id) {
            return false;
        }
        let selection_changed = self.repair_selection(&[id]);
        self.sync_selection_flags();
        self.commit(before);
        if selection_changed {
            self.notify_selection();
        }
        true
    }

    /// Moves a visible row into the hidden collection, deselecting it.
    pub fn hide_row(&mut self, id: RowId) -> bool {
        let before = self.counts();
        let mut selection_changed = false;
        if !self.hide_inner(id, &mut selection_changed) {
            return false;
        }
        selection_changed |= self.repair_selection(&[id]);
        self.sync_selection_flags();
        self.commit(before);
        if selection_changed {
            self.notify_selection();
        }
        true
    }

    /// Pins or unpins a row.
    pub fn set_row_pinned(&mut self, id: RowId, pinned: bool) -> GridResult<bool> {
        let row = self.rows.get_mut(id).ok_or(GridError::UnknownRow)?;
        if row.is_pinned() == pinned {
            return Ok(false);
        }
        row.set_pinned(pinned);
        if pinned {
            self.pinned_rows.push(id);
        } else {
            self.pinned_rows.retain(|&p| p != id);
        }
        if !self.is_suppressed() {
            self.signals.model_changed.emit(());
        }
        Ok(true)
    }

    /// Assigns contiguous indices to both partitions and recomputes banding.
    ///
    /// The band never flips between two rows of the same top-level group.
    pub fn reindex(&mut self) {
        let content = &*self.content;
        let labels = &*self.labels;
        self.rows.reindex(|previous, row| {
            let Some(previous) = previous else {
                return false;
            };
            let same_group = match (
                band_group(content, previous.element()),
                band_group(content, row.element()),
            ) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            !same_group && labels.should_alternate_background(Some(previous), row)
        });
        tracing::trace!(
            target: targets::MODEL,
            visible = self.rows.visible().len(),
            hidden = self.rows.hidden().len(),
            "reindexed"
        );
    }

    fn height_for(&self, element: &T) -> u32 {
        u32::try_from(self.labels.default_row_height(element))
            .unwrap_or(self.config.default_row_height)
    }

    /// Places an unplaced row at its sorted position.
    fn insert_visible(&mut self, id: RowId) {
        let Some(element) = self.rows.element(id).cloned() else {
            return;
        };
        let comparator = Self::comparator(&*self.content, &self.sort, &self.columns, &self.config);
        let index = self
            .rows
            .insertion_index(&element, |a, b| comparator.compare(a, b));
        self.rows.place_visible(id, index);
    }

    fn show_inner(&mut self, id: RowId) -> bool {
        if !self.rows.take_hidden(id) {
            return false;
        }
        self.insert_visible(id);
        true
    }

    fn hide_inner(&mut self, id: RowId, selection_changed: &mut bool) -> bool {
        if self.rows.take_visible(id).is_none() {
            return false;
        }
        self.rows.place_hidden(id);
        *selection_changed |= self.selection.remove_row(id);
        true
    }

    /// Moves a row whose sort key may have changed. A group parent moves
    /// with its visible descendants, whether or not it is visible itself.
    fn reposition(&mut self, id: RowId) {
        let Some(element) = self.rows.element(id).cloned() else {
            return;
        };
        let comparator = Self::comparator(&*self.content, &self.sort, &self.columns, &self.config);

        if is_parent_element(&*self.content, &*element) {
            let mut block: Vec<RowId> = {
                let view = Hierarchy::new(&self.rows, &*self.content);
                std::iter::once(id)
                    .chain(view.all_children(id))
                    .filter(|&r| self.rows.get(r).is_some_and(Row::is_visible))
                    .collect()
            };
            if block.is_empty() {
                return;
            }
            let members: HashSet<RowId> = block.iter().copied().collect();
            self.rows.take_visible_batch(&members);
            self.rows.sort_ids(&mut block, |a, b| comparator.compare(a, b));
            let index = self
                .rows
                .insertion_index(&element, |a, b| comparator.compare(a, b));
            self.rows.splice_visible(index, &block);
            tracing::trace!(target: targets::SORT, rows = block.len(), index, "relocated group");
            return;
        }

        let Some(position) = self.rows.visible_position(id) else {
            return;
        };
        let visible = self.rows.visible();
        let after_previous = position == 0
            || self
                .rows
                .element(visible[position - 1])
                .is_none_or(|p| comparator.compare(p, &element) != Ordering::Greater);
        let before_next = visible
            .get(position + 1)
            .and_then(|&n| self.rows.element(n))
            .is_none_or(|n| comparator.compare(&element, n) != Ordering::Greater);
        if after_previous && before_next {
            return;
        }
        self.rows.take_visible(id);
        let index = self
            .rows
            .insertion_index(&element, |a, b| comparator.compare(a, b));
        self.rows.place_visible(id, index);
    }

    /// Rows of the groups and ancestors of `elements`, without repeats.
    fn group_rows_of(&self, elements: &[Arc<T>]) -> Vec<RowId> {
        let content = &*self.content;
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for element in elements {
            let related = ancestors(content, &**element)
                .into_iter()
                .chain(whole_group(content, element));
            for member in related {
                if let Some(id) = self.rows.row_of(&member) {
                    if seen.insert(id) {
                        out.push(id);
                    }
                }
            }
        }
        out
    }

    /// Re-evaluates one row and moves it if its visibility changed.
    fn recheck_row(&mut self, id: RowId, selection_changed: &mut bool) -> bool {
        let Some(element) = self.rows.element(id).cloned() else {
            return false;
        };
        let outcome = self.filters.evaluate(&element, &*self.content);
        let was_visible = self.rows.get(id).is_some_and(Row::is_visible);
        if let Some(row) = self.rows.get_mut(id) {
            row.set_highlights(outcome.highlights);
        }
        match (was_visible, outcome.visible) {
            (false, true) => self.show_inner(id),
            (true, false) => self.hide_inner(id, selection_changed),
            _ => false,
        }
    }

    fn select_after_removal(&mut self, index: usize) -> bool {
        let visible = self.rows.visible();
        let Some(&target) = visible.get(index.min(visible.len().saturating_sub(1))) else {
            return false;
        };
        let view = Hierarchy::new(&self.rows, &*self.content);
        let rows = if self.selection.style() == SelectionStyle::MultiRow && view.is_group_row(target)
        {
            view.whole_group(target)
        } else {
            vec![target]
        };
        tracing::debug!(target: targets::SELECTION, index, "selecting row after removal");
        self.selection.set_selected_rows(&rows, &view)
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Installs a filter and re-applies the pipeline.
    pub fn add_filter<F>(&mut self, filter: F) -> FilterId
    where
        F: Filter<T> + 'static,
    {
        self.emit_filters_changing();
        let id = self.filters.add(Arc::new(filter));
        tracing::debug!(target: targets::FILTER, id = id.get(), "added filter");
        self.apply_filters();
        self.emit_filters_changed();
        id
    }

    /// Removes a filter. The structural collapse filter cannot be removed.
    pub fn remove_filter(&mut self, id: FilterId) -> bool {
        if self.filters.get(id).is_none() || id == FilterId::COLLAPSED {
            return false;
        }
        self.emit_filters_changing();
        self.filters.remove(id);
        tracing::debug!(target: targets::FILTER, id = id.get(), "removed filter");
        self.apply_filters();
        self.emit_filters_changed();
        true
    }

    /// Removes every filter except the structural one.
    pub fn clear_filters(&mut self) -> bool {
        if self.filters.len() <= 1 {
            return false;
        }
        self.emit_filters_changing();
        self.filters.clear();
        self.apply_filters();
        self.emit_filters_changed();
        true
    }

    /// Lets highlighting filters hide rows they do not match.
    pub fn set_hide_none_highlighted_rows(&mut self, hide: bool) {
        if self.filters.hide_none_highlighted_rows() == hide {
            return;
        }
        self.config.hide_none_highlighted_rows = hide;
        self.emit_filters_changing();
        self.filters.set_hide_none_highlighted_rows(hide);
        self.apply_filters();
        self.emit_filters_changed();
    }

    /// Re-evaluates every row.
    ///
    /// Both partitions are scanned before anything moves. Newly hidden rows
    /// are deselected; newly shown rows are inserted at their sorted
    /// positions.
    pub fn apply_filters(&mut self) {
        let _span = PerfSpan::new("apply_filters");
        let before = self.counts();
        let content = &*self.content;

        let mut highlights = Vec::new();
        let mut hide_order = Vec::new();
        for &id in self.rows.visible() {
            let Some(element) = self.rows.element(id) else {
                continue;
            };
            let outcome = self.filters.evaluate(element, content);
            if !outcome.visible {
                hide_order.push(id);
            }
            highlights.push((id, outcome.highlights));
        }
        let mut show_order = Vec::new();
        for &id in self.rows.hidden() {
            let Some(element) = self.rows.element(id) else {
                continue;
            };
            let outcome = self.filters.evaluate(element, content);
            if outcome.visible {
                show_order.push(id);
            }
            highlights.push((id, outcome.highlights));
        }
        for (id, matched) in highlights {
            if let Some(row) = self.rows.get_mut(id) {
                row.set_highlights(matched);
            }
        }

        let mut selection_changed = false;
        if !hide_order.is_empty() {
            let hide: HashSet<RowId> = hide_order.iter().copied().collect();
            self.rows.take_visible_batch(&hide);
            for &id in &hide_order {
                self.rows.place_hidden(id);
                selection_changed |= self.selection.remove_row(id);
            }
        }
        if !show_order.is_empty() {
            let show: HashSet<RowId> = show_order.iter().copied().collect();
            self.rows.take_hidden_batch(&show);
            for &id in &show_order {
                self.insert_visible(id);
            }
        }

        let moved: Vec<RowId> = hide_order.iter().chain(&show_order).copied().collect();
        if !moved.is_empty() {
            selection_changed |= self.repair_selection(&moved);
        }
        self.sync_selection_flags();
        tracing::debug!(
            target: targets::FILTER,
            hidden = hide_order.len(),
            shown = show_order.len(),
            "applied filters"
        );
        self.commit(before);
        if selection_changed {
            self.notify_selection();
        }
    }

    /// Re-checks a single row after its values changed. Returns `true` if
    /// the row moved between partitions.
    pub fn apply_filters_to_row(&mut self, id: RowId) -> bool {
        let before = self.counts();
        let mut selection_changed = false;
        let moved = self.recheck_row(id, &mut selection_changed);
        if moved {
            selection_changed |= self.repair_selection(&[id]);
            self.sync_selection_flags();
            self.commit(before);
        }
        if selection_changed {
            self.notify_selection();
        }
        moved
    }

    /// Re-applies filters to the descendants of `element` after the host
    /// collapsed or expanded it. Returns `true` if any row moved.
    pub fn refresh_collapsed(&mut self, element: &T) -> bool {
        let Some(id) = self.rows.row_of(element) else {
            return false;
        };
        let before = self.counts();
        let mut selection_changed = false;
        let mut moved = Vec::new();
        for child in self.all_children(id) {
            if self.recheck_row(child, &mut selection_changed) {
                moved.push(child);
            }
        }
        if moved.is_empty() {
            return false;
        }
        selection_changed |= self.repair_selection(&moved);
        self.sync_selection_flags();
        tracing::debug!(target: targets::FILTER, rows = moved.len(), "refreshed collapsed group");
        self.commit(before);
        if selection_changed {
            self.notify_selection();
        }
        true
    }

    fn emit_filters_changing(&self) {
        if !self.is_suppressed() {
            self.signals.filters_changing.emit(());
        }
    }

    fn emit_filters_changed(&self) {
        if !self.is_suppressed() {
            self.signals.filters_changed.emit(());
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selected rows in display order.
    pub fn selected_rows(&self) -> Vec<RowId> {
        self.rows
            .visible()
            .iter()
            .copied()
            .filter(|&id| self.selection.is_row_selected(id))
            .collect()
    }

    /// Elements of the selected rows in display order.
    pub fn selected_elements(&self) -> Vec<Arc<T>> {
        self.selected_rows()
            .into_iter()
            .filter_map(|id| self.rows.element(id).cloned())
            .collect()
    }

    /// Replaces the row selection. The anchor moves to the first row.
    pub fn set_selected_rows(&mut self, rows: &[RowId]) -> bool {
        self.with_selection(|selection, view, _| selection.set_selected_rows(rows, view))
    }

    /// Flips the selection of each row; a parent carries its group along.
    pub fn toggle_row_selections(&mut self, rows: &[RowId]) -> bool {
        self.with_selection(|selection, view, _| selection.toggle_row_selections(rows, view))
    }

    /// Selects from the anchor to `target`, inclusive.
    pub fn select_range(&mut self, target: RangeTarget, keep_existing: bool) -> bool {
        self.with_selection(|selection, view, layout| match &target {
            RangeTarget::Row(id) => selection.select_row_range(*id, keep_existing, view),
            RangeTarget::Column(id) => selection.select_column_range(id, keep_existing, layout),
        })
    }

    /// Replaces the column selection.
    pub fn set_selected_columns(&mut self, ids: &[ColumnId]) -> bool {
        self.with_selection(|selection, _, layout| selection.set_selected_columns(ids, layout))
    }

    /// Flips the selection of each column.
    pub fn toggle_column_selections(&mut self, ids: &[ColumnId]) -> bool {
        self.with_selection(|selection, _, layout| selection.toggle_column_selections(ids, layout))
    }

    /// Selects every visible row or column, depending on the style. Single
    /// styles are left alone.
    pub fn select_all(&mut self) -> bool {
        let style = self.selection.style();
        if style.is_single() {
            return false;
        }
        if style.is_column_based() {
            let layout = self.columns.visible().to_vec();
            return self.set_selected_columns(&layout);
        }
        let rows = self.rows.visible().to_vec();
        self.set_selected_rows(&rows)
    }

    /// Clears rows, columns and the anchor row.
    pub fn clear_selection(&mut self) -> bool {
        self.with_selection(|selection, _, _| selection.clear())
    }

    /// Moves the anchor cell without changing the selection.
    pub fn set_anchor(&mut self, row: Option<RowId>, column: Option<ColumnId>) -> GridResult<bool> {
        if row.is_some_and(|id| !self.rows.contains(id)) {
            return Err(GridError::UnknownRow);
        }
        if let Some(missing) = column.as_ref().filter(|c| !self.columns.contains(c)) {
            return Err(GridError::unknown_column(missing));
        }
        Ok(self.with_selection(|selection, _, _| {
            selection.set_anchor(row, column);
            false
        }))
    }

    /// Switches the selection style, clearing the current selection.
    pub fn set_selection_style(&mut self, style: SelectionStyle) {
        if self.selection.style() == style {
            return;
        }
        self.config.selection_style = style;
        self.with_selection(|selection, _, _| {
            let cleared = selection.clear();
            selection.set_style(style);
            cleared
        });
    }

    /// Enables or disables group selection consistency.
    pub fn set_group_selection_consistency(&mut self, enabled: bool) {
        self.config.group_selection_consistency = enabled;
        self.selection.set_group_consistency(enabled);
    }

    /// Moves the cursor and updates the selection.
    ///
    /// Crossing between group and leaf rows restores the anchor column last
    /// used on that kind of row. Without `extend` the target row (or its
    /// whole group, for a parent in multi-row mode) replaces the selection;
    /// with `extend` the range from the anchor to the target is selected.
    /// The target is scrolled into view.
    pub fn navigate(&mut self, navigation: Navigation, extend: bool) -> bool {
        let count = self.rows.visible().len();
        if count == 0 {
            return false;
        }
        let last_row = count - 1;
        let layout = self.columns.visible();
        let last_column = layout.len().checked_sub(1);
        let current_row = self.selection.current_row();
        let current = current_row.and_then(|id| self.rows.visible_position(id));
        let style = self.selection.style();
        let anchor_column = self
            .selection
            .anchor_column()
            .and_then(|c| layout.iter().position(|l| l == c));
        // A column range moves from the end opposite its anchor.
        let current_column = if style.is_column_based() {
            let selected: Vec<usize> = self
                .selection
                .selected_columns()
                .iter()
                .filter_map(|c| layout.iter().position(|l| l == c))
                .collect();
            match (anchor_column, selected.iter().min(), selected.iter().max()) {
                (Some(anchor), Some(&lo), Some(&hi)) => Some(if anchor == lo { hi } else { lo }),
                _ => anchor_column,
            }
        } else {
            anchor_column
        };
        let page = self.viewport.page_row_count(&layout!(self));
        let here = current.unwrap_or(0);

        let (row_pos, column_pos) = match navigation {
            Navigation::Up => (current.map_or(0, |p| p.saturating_sub(1)), current_column),
            Navigation::Down => (current.map_or(0, |p| (p + 1).min(last_row)), current_column),
            Navigation::PageUp => (current.map_or(0, |p| p.saturating_sub(page)), current_column),
            Navigation::PageDown => (current.map_or(0, |p| (p + page).min(last_row)), current_column),
            Navigation::FirstRow => (0, current_column),
            Navigation::LastRow => (last_row, current_column),
            Navigation::Left => (here, last_column.map(|_| current_column.map_or(0, |c| c.saturating_sub(1)))),
            Navigation::Right => (
                here,
                last_column.map(|l| current_column.map_or(0, |c| (c + 1).min(l))),
            ),
            Navigation::Home => (here, last_column.map(|_| 0)),
            Navigation::End => (here, last_column),
        };
        let Some(&target) = self.rows.visible().get(row_pos) else {
            return false;
        };
        let mut column = column_pos.and_then(|i| layout.get(i).cloned());

        let before = self.selection_cursor();
        let changed = {
            let view = Hierarchy::new(&self.rows, &*self.content);
            let selection = &mut self.selection;
            let target_is_group = view.is_parent_row(target);
            if navigation.is_vertical() {
                if let Some(current_row) = current_row {
                    let current_is_group = view.is_parent_row(current_row);
                    if current_is_group != target_is_group {
                        selection.remember_anchor_column(current_is_group);
                        if let Some(remembered) = selection
                            .remembered_anchor_column(target_is_group)
                            .filter(|c| layout.contains(c))
                        {
                            column = Some(remembered.clone());
                        }
                    }
                }
            }

            let changed = if style.is_column_based() {
                match &column {
                    Some(c) if extend && !style.is_single() => {
                        selection.set_current_row(Some(target));
                        selection.select_column_range(c, false, layout)
                    }
                    Some(c) => {
                        selection.set_anchor(Some(target), Some(c.clone()));
                        selection.set_selected_columns(std::slice::from_ref(c), layout)
                    }
                    None => false,
                }
            } else if extend && !style.is_single() {
                selection.select_row_range(target, false, &view)
            } else if style == SelectionStyle::MultiRow && target_is_group {
                selection.set_selected_rows(&view.whole_group(target), &view)
            } else {
                selection.set_selected_rows(&[target], &view)
            };
            if !(style.is_column_based() && extend) {
                selection.set_anchor_column(column.clone());
            }
            changed
        };
        self.sync_selection_flags();
        let changed = changed || self.selection_cursor() != before;
        if changed {
            self.notify_selection();
        }

        let column_index = column.as_ref().and_then(|c| self.columns.layout_index(c));
        self.viewport
            .reveal(column_index, Some(row_pos), &layout!(self));
        tracing::trace!(target: targets::SELECTION, ?navigation, extend, row_pos, "navigated");
        changed
    }

    fn selection_cursor(&self) -> (Option<RowId>, Option<ColumnId>, Option<RowId>) {
        (
            self.selection.anchor_row(),
            self.selection.anchor_column().cloned(),
            self.selection.current_row(),
        )
    }

    /// Runs a selection operation, mirrors its row flag changes onto the rows
    /// and emits `selection_changed` when anything changed.
    fn with_selection<F>(&mut self, operation: F) -> bool
    where
        F: FnOnce(&mut SelectionModel, &Hierarchy<'_, T>, &[ColumnId]) -> bool,
    {
        let before = self.selection_cursor();
        let changed = {
            let view = Hierarchy::new(&self.rows, &*self.content);
            operation(&mut self.selection, &view, self.columns.visible())
        };
        self.sync_selection_flags();
        let changed = changed || self.selection_cursor() != before;
        if changed {
            self.notify_selection();
        }
        changed
    }

    fn repair_selection(&mut self, affected: &[RowId]) -> bool {
        let view = Hierarchy::new(&self.rows, &*self.content);
        self.selection.repair_groups(affected, &view)
    }

    fn sync_selection_flags(&mut self) {
        for (id, selected) in self.selection.take_changes() {
            if let Some(row) = self.rows.get_mut(id) {
                row.set_selected(selected);
            }
        }
    }

    // =========================================================================
    // Viewport
    // =========================================================================

    /// Resizes the client area.
    pub fn set_client_size(&mut self, size: Size) {
        self.viewport.set_client_size(size);
    }

    /// Current scroll offset.
    pub fn scroll(&self) -> Point {
        self.viewport.scroll()
    }

    /// Scrolls, clamped to the content. Returns `true` if the offset changed.
    pub fn set_scroll(&mut self, offset: Point) -> bool {
        self.viewport.set_scroll(offset, &layout!(self))
    }

    /// Visible row and column index ranges.
    pub fn visible_cell_range(&self) -> CellRange {
        self.viewport.calculate_visible_cell_range(&layout!(self))
    }

    /// Rows currently on screen, in display order.
    pub fn rows_in_view(&self) -> &[RowId] {
        match self.visible_cell_range().rows {
            Some(range) => &self.rows.visible()[range.first..=range.last],
            None => &[],
        }
    }

    /// The scrollable viewport rectangle.
    pub fn viewport_area(&self) -> Rect {
        self.viewport.viewport_area(&layout!(self))
    }

    /// Hit-tests a y coordinate.
    pub fn row_at(&self, y: i64) -> RowHit {
        self.viewport.row_index_at(y, &layout!(self))
    }

    /// The row under a y coordinate.
    pub fn row_id_at(&self, y: i64) -> Option<RowId> {
        match self.row_at(y) {
            RowHit::Row(index) => self.rows.visible().get(index).copied(),
            _ => None,
        }
    }

    /// Hit-tests an x coordinate.
    pub fn column_at(&self, x: i64) -> ColumnHit {
        self.viewport.column_index_at(x, &layout!(self))
    }

    /// The column under an x coordinate.
    pub fn column_id_at(&self, x: i64) -> Option<&ColumnId> {
        self.column_at(x)
            .column()
            .and_then(|index| self.columns.visible().get(index))
    }

    /// Scrolls the minimum needed to show a row and optionally a column.
    pub fn reveal(&mut self, row: RowId, column: Option<&ColumnId>) -> bool {
        let Some(position) = self.rows.visible_position(row) else {
            return false;
        };
        let column = column.and_then(|c| self.columns.layout_index(c));
        self.viewport.reveal(column, Some(position), &layout!(self))
    }

    /// Rectangle of a cell in client coordinates.
    pub fn cell_rect(&self, row: RowId, column: &ColumnId) -> Option<Rect> {
        let position = self.rows.visible_position(row)?;
        let column = self.columns.layout_index(column)?;
        self.viewport.cell_rect(column, position, &layout!(self))
    }

    /// Rectangle of a column in client coordinates.
    pub fn column_rect(&self, column: &ColumnId) -> Option<Rect> {
        let column = self.columns.layout_index(column)?;
        self.viewport.column_rect(column, &layout!(self))
    }

    /// Layout index a dragged header would drop at.
    pub fn column_drop_index(&self, x: i64) -> usize {
        self.viewport.column_drop_index(x, &layout!(self))
    }

    /// Rows that fit on one page.
    pub fn page_row_count(&self) -> usize {
        self.viewport.page_row_count(&layout!(self))
    }

    /// Next scroll offset while dragging past an edge, `None` to stop.
    pub fn auto_scroll_step(&self, pointer: Point) -> Option<Point> {
        self.viewport
            .auto_scroll_step(pointer, self.config.auto_scroll_step, &layout!(self))
    }

    /// Shows or hides the row-number gutter.
    pub fn set_row_numbers_visible(&mut self, visible: bool) {
        if self.config.show_row_numbers != visible {
            self.config.show_row_numbers = visible;
            self.viewport.invalidate();
            if !self.is_suppressed() {
                self.signals.row_numbers_visibility_changed.emit(visible);
            }
        }
    }

    /// Shows or hides the group-selector gutter.
    pub fn set_group_selector_visible(&mut self, visible: bool) {
        if self.config.show_group_selector != visible {
            self.config.show_group_selector = visible;
            self.viewport.invalidate();
            if !self.is_suppressed() {
                self.signals.group_selector_visibility_changed.emit(visible);
            }
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Returns `false` while events are suppressed.
    pub fn events_enabled(&self) -> bool {
        self.suppress_depth == 0
    }

    /// Disables (`false`) or re-enables (`true`) aggregate events.
    ///
    /// Calls nest. When the last suppression ends the model reindexes once
    /// and emits one round of aggregate signals for everything that
    /// happened in between.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnbalancedEventSuppression`] when events are
    /// enabled more often than they were disabled.
    pub fn enable_events(&mut self, enable: bool) -> GridResult<()> {
        if !enable {
            if self.suppress_depth == 0 {
                self.suppressed_from = Some(self.counts());
            }
            self.suppress_depth += 1;
            tracing::trace!(target: targets::MODEL, depth = self.suppress_depth, "events suppressed");
            return Ok(());
        }
        if self.suppress_depth == 0 {
            tracing::error!(target: targets::MODEL, "events enabled more often than disabled");
            return Err(GridError::UnbalancedEventSuppression);
        }
        self.suppress_depth -= 1;
        if self.suppress_depth == 0 {
            let before = self.suppressed_from.take().unwrap_or_else(|| self.counts());
            self.commit(before);
            if std::mem::take(&mut self.selection_pending) {
                self.signals.selection_changed.emit(());
            }
            tracing::trace!(target: targets::MODEL, "events resumed");
        }
        Ok(())
    }

    /// Suppresses events until the returned guard is dropped.
    pub fn suppress_events(&mut self) -> EventSuppression<'_, T> {
        // Disabling never fails.
        let _ = self.enable_events(false);
        EventSuppression { model: self }
    }

    fn is_suppressed(&self) -> bool {
        self.suppress_depth > 0
    }

    fn counts(&self) -> Counts {
        Counts {
            visible: self.rows.visible().len(),
            hidden: self.rows.hidden().len(),
            height: self.rows.visible_height(),
        }
    }

    /// Ends a structural change: one reindex and the aggregate signals.
    /// Deferred while events are suppressed.
    fn commit(&mut self, before: Counts) {
        self.viewport.invalidate();
        if self.is_suppressed() {
            return;
        }
        self.reindex();
        let after = self.counts();
        if (after.visible, after.hidden) != (before.visible, before.hidden) {
            self.signals
                .row_count_changed
                .emit((after.visible, after.hidden));
        }
        self.signals.emit_height_delta(after.height - before.height);
        self.signals.model_changed.emit(());
    }

    fn notify_layout_changed(&mut self) {
        self.viewport.invalidate();
        if !self.is_suppressed() {
            self.signals.model_changed.emit(());
        }
    }

    fn notify_selection(&mut self) {
        if self.is_suppressed() {
            self.selection_pending = true;
        } else {
            self.signals.selection_changed.emit(());
        }
    }
}

impl<T> std::fmt::Debug for GridModel<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridModel")
            .field("columns", &self.columns.all().len())
            .field("visible_rows", &self.rows.visible().len())
            .field("hidden_rows", &self.rows.hidden().len())
            .field("selected_rows", &self.selection.row_count())
            .field("suppress_depth", &self.suppress_depth)
            .finish_non_exhaustive()
    }
}

/// Identity of the top-level group an element belongs to, if any.
fn band_group<T>(content: &dyn ContentProvider<T>, element: &Arc<T>) -> Option<ElementKey> {
    match ancestors(content, &**element).last() {
        Some(root) => Some(ElementKey::of(root)),
        None => is_parent_element(content, &**element).then(|| ElementKey::of(element)),
    }
}

/// Scoped event suppression. Events resume when the guard is dropped.
///
/// Derefs to the model so a batch of edits can run through the guard.
pub struct EventSuppression<'a, T: Send + Sync + 'static> {
    model: &'a mut GridModel<T>,
}

impl<T: Send + Sync + 'static> Deref for EventSuppression<'_, T> {
    type Target = GridModel<T>;

    fn deref(&self) -> &Self::Target {
        self.model
    }
}

impl<T: Send + Sync + 'static> DerefMut for EventSuppression<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.model
    }
}

impl<T: Send + Sync + 'static> Drop for EventSuppression<'_, T> {
    fn drop(&mut self) {
        if let Err(err) = self.model.enable_events(true) {
            tracing::error!(target: targets::MODEL, %err, "failed to resume events");
        }
    }
}

/// Read-only layout view of a model for the viewport.
struct GridLayout<'a, T> {
    rows: &'a RowTable<T>,
    columns: &'a ColumnSet,
    config: &'a GridConfig,
    labels: &'a dyn LabelProvider<T>,
    header: bool,
}

impl<T> LayoutSource for GridLayout<'_, T> {
    fn row_count(&self) -> usize {
        self.rows.visible().len()
    }

    fn row_height(&self, index: usize) -> u32 {
        self.rows
            .visible()
            .get(index)
            .and_then(|&id| self.rows.get(id))
            .map_or(0, Row::height)
    }

    fn column_count(&self) -> usize {
        self.columns.visible().len()
    }

    fn pinned_column_count(&self) -> usize {
        self.columns.pinned_count()
    }

    fn column_width(&self, index: usize) -> u32 {
        self.columns.layout_column(index).map_or(0, Column::width)
    }

    fn header_height(&self) -> u32 {
        if self.header {
            self.config.header_height
        } else {
            0
        }
    }

    fn row_number_padding(&self) -> Option<u32> {
        self.config
            .show_row_numbers
            .then_some(self.config.row_number_padding)
    }

    fn group_selector_width(&self) -> u32 {
        if self.config.show_group_selector {
            self.config.group_selector_width
        } else {
            0
        }
    }

    fn text_width(&self, text: &str) -> u32 {
        self.labels.text_width(text)
    }
}

static_assertions::assert_impl_all!(GridModel<String>: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use super::*;
    use crate::model::hierarchy::test_support::{Labels, Person, Tree};
    use crate::model::{PredicateFilter, SortDirection};

    fn grid_with(tree: &Arc<Tree>, config: GridConfig) -> GridModel<Person> {
        let mut grid = GridModel::new(tree.clone(), Arc::new(Labels), config);
        grid.add_columns([
            Column::new("name", "Name"),
            Column::new("surname", "Surname"),
            Column::new("age", "Age"),
        ])
        .unwrap();
        grid
    }

    fn grid(tree: &Arc<Tree>) -> GridModel<Person> {
        grid_with(tree, GridConfig::default())
    }

    fn names(grid: &GridModel<Person>) -> Vec<String> {
        grid.visible_rows()
            .iter()
            .map(|&id| grid.element(id).unwrap().name.clone())
            .collect()
    }

    fn counter<A: Send + 'static>(signal: &horizon_grid_core::Signal<A>) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        signal.connect(move |_| {
            inner.fetch_add(1, AtomicOrdering::SeqCst);
        });
        count
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let err = grid.add_columns([Column::new("age", "Again")]).unwrap_err();
        assert_eq!(err, GridError::DuplicateColumnId(ColumnId::from("age")));

        let err = grid
            .add_columns([Column::new("x", "X"), Column::new("x", "X")])
            .unwrap_err();
        assert_eq!(err, GridError::DuplicateColumnId(ColumnId::from("x")));
        assert!(grid.column(&ColumnId::from("x")).is_none());
        assert!(grid.has_header_row());
    }

    #[test]
    fn test_insert_keeps_sorted_order() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        grid.sort(&ColumnId::from("age"), true, false, false).unwrap();

        grid.add_elements([
            Tree::person("c", "", 30, 0),
            Tree::person("a", "", 10, 1),
        ]);
        grid.add_elements([Tree::person("b", "", 20, 2)]);
        assert_eq!(names(&grid), ["a", "b", "c"]);

        let indices: Vec<Option<usize>> = grid
            .visible_rows()
            .iter()
            .map(|&id| grid.row(id).unwrap().visible_index())
            .collect();
        assert_eq!(indices, [Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn test_initial_sort_direction_is_adopted() {
        let tree = Arc::new(Tree::default());
        let mut grid = GridModel::new(tree.clone(), Arc::new(Labels), GridConfig::default());
        grid.add_columns([Column::new("name", "Name")]).unwrap();
        grid.add_elements([Tree::person("b", "", 0, 0), Tree::person("a", "", 0, 1)]);
        assert_eq!(names(&grid), ["b", "a"]);

        let sorted = counter(&grid.signals().column_sorted);
        grid.add_columns([Column::new("age", "Age")]).unwrap();
        grid.add_columns([
            Column::new("surname", "Surname").with_sort_direction(SortDirection::Descending)
        ])
        .unwrap();
        assert_eq!(grid.sort_model().active(), [ColumnId::from("surname")]);
        assert_eq!(sorted.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn test_add_emits_aggregate_signals() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let changed = counter(&grid.signals().model_changed);
        let heights = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = heights.clone();
        grid.signals().height_changed.connect(move |delta| sink.lock().push(*delta));

        let shown = grid.add_elements((0..4).map(|i| Tree::person("p", "", i, i)));
        assert_eq!(shown.len(), 4);
        assert_eq!(changed.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(*heights.lock(), vec![4 * 22]);
    }

    #[test]
    fn test_duplicate_element_is_ignored() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let p = Tree::person("p", "", 0, 0);
        grid.add_elements([p.clone()]);
        let shown = grid.add_elements([p.clone()]);
        assert!(shown.is_empty());
        assert_eq!(grid.row_count(), 1);
    }

    #[test]
    fn test_suppression_batches_events() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let changed = counter(&grid.signals().model_changed);
        let counts = counter(&grid.signals().row_count_changed);

        grid.enable_events(false).unwrap();
        grid.enable_events(false).unwrap();
        grid.add_elements([Tree::person("b", "", 2, 0)]);
        grid.add_elements([Tree::person("a", "", 1, 1)]);
        grid.enable_events(true).unwrap();
        assert_eq!(changed.load(AtomicOrdering::SeqCst), 0);
        grid.enable_events(true).unwrap();
        assert_eq!(changed.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(counts.load(AtomicOrdering::SeqCst), 1);
        assert!(!grid.rows().is_stale());

        assert_eq!(
            grid.enable_events(true),
            Err(GridError::UnbalancedEventSuppression)
        );
    }

    #[test]
    fn test_suppression_guard() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let changed = counter(&grid.signals().model_changed);
        {
            let mut batch = grid.suppress_events();
            batch.add_elements([Tree::person("a", "", 1, 0)]);
            batch.add_elements([Tree::person("b", "", 2, 1)]);
            assert!(!batch.events_enabled());
        }
        assert!(grid.events_enabled());
        assert_eq!(changed.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(grid.visible_row_count(), 2);
    }

    #[test]
    fn test_hide_row_deselects() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let rows = grid.add_elements([Tree::person("a", "", 0, 0), Tree::person("b", "", 0, 1)]);
        grid.set_selected_rows(&[rows[0]]);
        assert!(grid.row(rows[0]).unwrap().is_selected());

        assert!(grid.hide_row(rows[0]));
        assert!(!grid.row(rows[0]).unwrap().is_selected());
        assert_eq!(grid.selection().anchor_row(), None);
        assert_eq!(grid.hidden_rows(), [rows[0]]);

        assert!(grid.show_row(rows[0]));
        assert_eq!(grid.visible_rows(), rows.as_slice());
    }

    #[test]
    fn test_update_moves_leaf() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        grid.sort(&ColumnId::from("age"), true, false, false).unwrap();
        let a = Tree::person("a", "", 10, 0);
        grid.add_elements([a.clone(), Tree::person("b", "", 20, 1), Tree::person("c", "", 30, 2)]);
        assert_eq!(names(&grid), ["a", "b", "c"]);

        tree.set_age(&a, 25);
        grid.update_elements(&[a.clone()]);
        assert_eq!(names(&grid), ["b", "a", "c"]);

        // Still in order: nothing moves.
        tree.set_age(&a, 21);
        grid.update_elements(&[a.clone()]);
        assert_eq!(names(&grid), ["b", "a", "c"]);
    }

    #[test]
    fn test_update_relocates_group_block() {
        let tree = Arc::new(Tree::default());
        let parent = Tree::person("m", "", 50, 0);
        let kids = vec![Tree::person("k1", "", 1, 1), Tree::person("k2", "", 2, 2)];
        tree.group(&parent, &kids);
        let mut grid = grid(&tree);
        grid.sort(&ColumnId::from("age"), true, false, false).unwrap();

        grid.add_elements([Tree::person("x", "", 10, 3), Tree::person("y", "", 90, 4)]);
        grid.add_elements([parent.clone()]);
        grid.add_elements(kids.clone());
        assert_eq!(names(&grid), ["x", "m", "k1", "k2", "y"]);

        tree.set_age(&parent, 95);
        grid.update_elements(&[parent.clone()]);
        assert_eq!(names(&grid), ["x", "y", "m", "k1", "k2"]);

        tree.set_age(&parent, 5);
        grid.update_elements(&[parent.clone()]);
        assert_eq!(names(&grid), ["m", "k1", "k2", "x", "y"]);
    }

    #[test]
    fn test_update_of_hidden_parent_moves_visible_children() {
        let tree = Arc::new(Tree::default());
        let parent = Tree::person("m", "", 5, 0);
        let kids = vec![Tree::person("k1", "", 20, 1), Tree::person("k2", "", 21, 2)];
        tree.group(&parent, &kids);
        let mut grid = grid(&tree);
        grid.sort(&ColumnId::from("age"), true, false, false).unwrap();
        grid.add_filter(PredicateFilter::new("no-m", |p: &Person| p.name != "m"));
        grid.add_elements([Tree::person("x", "", 10, 3), Tree::person("y", "", 90, 4)]);
        grid.add_elements([parent.clone()]);
        grid.add_elements(kids.clone());
        assert_eq!(names(&grid), ["k1", "k2", "x", "y"]);

        tree.set_age(&parent, 95);
        grid.update_elements(&[parent.clone()]);
        assert_eq!(names(&grid), ["x", "y", "k1", "k2"]);
        assert!(!grid.rows().is_stale());
    }

    #[test]
    fn test_update_showing_parent_brings_children_along() {
        let tree = Arc::new(Tree::default());
        let parent = Tree::person("m", "", 5, 0);
        let kids = vec![Tree::person("k1", "", 20, 1), Tree::person("k2", "", 21, 2)];
        tree.group(&parent, &kids);
        let mut grid = grid(&tree);
        grid.sort(&ColumnId::from("age"), true, false, false).unwrap();
        let ages = tree.clone();
        grid.add_filter(PredicateFilter::new("adults", move |p: &Person| ages.age(p) >= 10));
        grid.add_elements([Tree::person("x", "", 10, 3), Tree::person("y", "", 90, 4)]);
        grid.add_elements([parent.clone()]);
        grid.add_elements(kids.clone());
        assert_eq!(names(&grid), ["k1", "k2", "x", "y"]);

        // Hidden to visible.
        tree.set_age(&parent, 95);
        grid.update_elements(&[parent.clone()]);
        assert_eq!(names(&grid), ["x", "y", "m", "k1", "k2"]);

        // Visible to hidden.
        tree.set_age(&parent, 5);
        grid.update_elements(&[parent.clone()]);
        assert_eq!(names(&grid), ["k1", "k2", "x", "y"]);
    }

    #[test]
    fn test_new_child_deselects_selected_parent() {
        let tree = Arc::new(Tree::default());
        let parent = Tree::person("p", "", 0, 0);
        let kids = vec![
            Tree::person("k1", "", 0, 1),
            Tree::person("k2", "", 0, 2),
            Tree::person("k3", "", 0, 3),
        ];
        tree.group(&parent, &kids);
        let mut grid = grid(&tree);
        grid.add_elements([parent.clone(), kids[0].clone(), kids[1].clone()]);
        let p = grid.row_of(&parent).unwrap();
        grid.toggle_row_selections(&[p]);
        assert_eq!(grid.selected_rows().len(), 3);
        let selections = counter(&grid.signals().selection_changed);

        let added = grid.add_elements([kids[2].clone()]);
        assert!(!grid.row(added[0]).unwrap().is_selected());
        assert!(!grid.row(p).unwrap().is_selected());
        assert!(!grid.selection().is_row_selected(p));
        assert_eq!(grid.selected_rows().len(), 2);
        assert_eq!(selections.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_banding_does_not_flip_inside_group() {
        let tree = Arc::new(Tree::default());
        let parent = Tree::person("g", "", 0, 0);
        let kids = vec![Tree::person("k1", "", 0, 1), Tree::person("k2", "", 0, 2)];
        tree.group(&parent, &kids);
        let mut grid = grid(&tree);
        grid.add_elements([parent.clone()]);
        grid.add_elements(kids.clone());
        grid.add_elements([Tree::person("z", "", 0, 3)]);

        let bands: Vec<bool> = grid
            .visible_rows()
            .iter()
            .map(|&id| grid.row(id).unwrap().alternate_background())
            .collect();
        assert_eq!(bands, [false, false, false, true]);
    }

    #[test]
    fn test_remove_selects_next_row() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let people: Vec<Arc<Person>> = (0..5).map(|i| Tree::person("p", "", 0, i)).collect();
        let rows = grid.add_elements(people.clone());
        grid.set_selected_rows(&[rows[1], rows[2]]);

        grid.remove_elements(&[people[1].clone(), people[2].clone()]);
        assert_eq!(grid.selected_rows(), [rows[3]]);
        assert!(grid.row(rows[3]).unwrap().is_selected());

        grid.set_selected_rows(&[rows[4]]);
        grid.remove_elements(&[people[4].clone()]);
        assert_eq!(grid.selected_rows(), [rows[3]]);
    }

    #[test]
    fn test_remove_without_auto_select() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid_with(&tree, GridConfig::new().select_next_on_remove(false));
        let people: Vec<Arc<Person>> = (0..3).map(|i| Tree::person("p", "", 0, i)).collect();
        let rows = grid.add_elements(people.clone());
        grid.set_selected_rows(&[rows[0]]);
        grid.remove_elements(&[people[0].clone()]);
        assert!(grid.selected_rows().is_empty());
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.rows().identity_len(), 2);
    }

    #[test]
    fn test_filters_partition_rows() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let rows = grid.add_elements((0..6).map(|i| Tree::person("p", "", i, i)));
        grid.set_selected_rows(&[rows[1]]);
        let selection = counter(&grid.signals().selection_changed);

        let id = grid.add_filter(PredicateFilter::new("even", |p: &Person| p.age % 2 == 0));
        assert_eq!(grid.visible_row_count(), 3);
        assert_eq!(grid.hidden_rows().len(), 3);
        assert_eq!(selection.load(AtomicOrdering::SeqCst), 1);
        assert!(grid.selected_rows().is_empty());

        assert!(grid.remove_filter(id));
        assert_eq!(grid.visible_row_count(), 6);
        assert_eq!(grid.visible_rows(), rows.as_slice());
        assert!(!grid.remove_filter(FilterId::COLLAPSED));
    }

    #[test]
    fn test_refresh_collapsed() {
        let tree = Arc::new(Tree::default());
        let parent = Tree::person("g", "", 0, 0);
        let kids = vec![Tree::person("k1", "", 0, 1), Tree::person("k2", "", 0, 2)];
        tree.group(&parent, &kids);
        let mut grid = grid(&tree);
        grid.add_elements([parent.clone()]);
        grid.add_elements(kids.clone());

        tree.set_collapsed(&parent, true);
        assert!(grid.refresh_collapsed(&parent));
        assert_eq!(names(&grid), ["g"]);

        tree.set_collapsed(&parent, false);
        assert!(grid.refresh_collapsed(&parent));
        assert_eq!(names(&grid), ["g", "k1", "k2"]);
    }

    #[test]
    fn test_group_by_toggles_visibility_without_sorting() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        grid.add_elements([Tree::person("b", "", 0, 0), Tree::person("a", "", 0, 1)]);
        let sorted = counter(&grid.signals().column_sorted);

        assert!(grid.group_by(&[ColumnId::from("name")]).unwrap());
        assert!(!grid.column(&ColumnId::from("name")).unwrap().is_visible());
        assert_eq!(grid.columns().group_by(), [ColumnId::from("name")]);
        assert_eq!(names(&grid), ["b", "a"]);
        assert_eq!(sorted.load(AtomicOrdering::SeqCst), 0);

        assert!(grid.ungroup_all());
        assert!(grid.column(&ColumnId::from("name")).unwrap().is_visible());
        assert!(grid.group_by(&[ColumnId::from("nope")]).is_err());
    }

    #[test]
    fn test_remove_column_drops_sort() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        grid.add_elements([Tree::person("b", "", 0, 0), Tree::person("a", "", 0, 1)]);
        grid.sort(&ColumnId::from("name"), true, false, true).unwrap();
        assert_eq!(names(&grid), ["a", "b"]);

        assert!(grid.remove_columns(&[ColumnId::from("name")]));
        assert!(!grid.sort_model().is_sorted());
        assert_eq!(names(&grid), ["b", "a"]);
    }

    #[test]
    fn test_column_signals() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let moves = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = moves.clone();
        grid.signals()
            .column_moved
            .connect(move |(id, from, to)| sink.lock().push((id.clone(), *from, *to)));

        assert!(grid.move_column(&ColumnId::from("age"), 0).unwrap());
        assert_eq!(*moves.lock(), vec![(ColumnId::from("age"), 2, 0)]);
        assert_eq!(grid.columns().visible()[0], ColumnId::from("age"));

        let resized = counter(&grid.signals().column_resized);
        assert!(grid.set_column_width(&ColumnId::from("age"), 40).unwrap());
        assert!(!grid.set_column_width(&ColumnId::from("age"), 40).unwrap());
        assert_eq!(resized.load(AtomicOrdering::SeqCst), 1);

        assert!(grid.set_column_pinned(&ColumnId::from("surname"), true).unwrap());
        assert_eq!(grid.columns().visible()[0], ColumnId::from("surname"));
        assert_eq!(grid.columns().pinned_count(), 1);
    }

    #[test]
    fn test_navigation() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        grid.set_client_size(Size::new(400, 24 + 22 * 3));
        let rows = grid.add_elements((0..10).map(|i| Tree::person("p", "", 0, i)));

        assert!(grid.navigate(Navigation::Down, false));
        assert_eq!(grid.selected_rows(), [rows[0]]);
        grid.navigate(Navigation::Down, false);
        grid.navigate(Navigation::Down, true);
        assert_eq!(grid.selected_rows(), [rows[1], rows[2]]);
        assert_eq!(grid.selection().anchor_row(), Some(rows[1]));

        grid.navigate(Navigation::LastRow, false);
        assert_eq!(grid.selected_rows(), [rows[9]]);
        assert_eq!(grid.rows_in_view().last(), Some(&rows[9]));

        grid.navigate(Navigation::PageUp, false);
        assert_eq!(grid.selected_rows(), [rows[6]]);

        grid.navigate(Navigation::End, false);
        assert_eq!(grid.selection().anchor_column(), Some(&ColumnId::from("age")));
        grid.navigate(Navigation::Left, false);
        assert_eq!(grid.selection().anchor_column(), Some(&ColumnId::from("surname")));
    }

    #[test]
    fn test_column_navigation_extends_from_anchor() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        grid.add_elements([Tree::person("a", "", 0, 0)]);
        grid.set_selection_style(SelectionStyle::MultiColumn);
        let ids = |names: &[&str]| names.iter().map(|n| ColumnId::from(*n)).collect::<Vec<_>>();

        grid.navigate(Navigation::Home, false);
        assert_eq!(grid.selection().selected_columns(), ids(&["name"]));
        grid.navigate(Navigation::Right, true);
        grid.navigate(Navigation::Right, true);
        assert_eq!(grid.selection().selected_columns(), ids(&["name", "surname", "age"]));
        grid.navigate(Navigation::Left, true);
        assert_eq!(grid.selection().selected_columns(), ids(&["name", "surname"]));
        assert_eq!(grid.selection().anchor_column(), Some(&ColumnId::from("name")));
    }

    #[test]
    fn test_set_anchor_validates() {
        let tree = Arc::new(Tree::default());
        let mut grid = grid(&tree);
        let rows = grid.add_elements([Tree::person("a", "", 0, 0)]);
        assert!(grid.set_anchor(Some(rows[0]), Some(ColumnId::from("age"))).unwrap());
        assert_eq!(
            grid.set_anchor(None, Some(ColumnId::from("zzz"))),
            Err(GridError::UnknownColumn(ColumnId::from("zzz")))
        );
        grid.remove_elements(&[grid.element(rows[0]).unwrap().clone()]);
        assert_eq!(grid.selection().anchor_row(), None);
        assert_eq!(grid.set_anchor(Some(rows[0]), None), Err(GridError::UnknownRow));
    }

    #[test]
    fn test_empty_model_operations_are_noops() {
        let tree = Arc::new(Tree::default());
        let mut grid: GridModel<Person> =
            GridModel::new(tree.clone(), Arc::new(Labels), GridConfig::default());
        grid.apply_filters();
        assert!(!grid.navigate(Navigation::Down, false));
        assert!(!grid.select_all());
        assert!(!grid.clear_selection());
        assert_eq!(grid.remove_elements(&[Tree::person("x", "", 0, 0)]), 0);
        assert!(grid.visible_cell_range().rows.is_none());
        assert!(grid.sort(&ColumnId::from("name"), true, false, true).is_err());
    }
}
