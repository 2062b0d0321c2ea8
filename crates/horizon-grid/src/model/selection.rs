//! Selection model.
//!
//! Tracks selected rows (identity set of [`RowId`]s) or selected columns,
//! the anchor cell used for range selection and keyboard navigation, and
//! keeps group parents consistent with their leaf rows.
//!
//! Hidden rows are never selected: every operation ignores rows outside the
//! visible sequence, and hiding a row deselects it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::column::ColumnId;
use super::hierarchy::Hierarchy;
use super::row::RowId;

/// How the user selects rows, columns or cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SelectionStyle {
    /// Any number of rows.
    #[default]
    MultiRow,
    /// At most one row.
    SingleRow,
    /// Any number of columns.
    MultiColumn,
    /// At most one column.
    SingleColumn,
    /// A single cell: the anchor row and anchor column.
    SingleCell,
}

impl SelectionStyle {
    /// Styles that select rows (including the row of a single cell).
    pub fn is_row_based(self) -> bool {
        matches!(
            self,
            SelectionStyle::MultiRow | SelectionStyle::SingleRow | SelectionStyle::SingleCell
        )
    }

    /// Styles that select whole columns.
    pub fn is_column_based(self) -> bool {
        matches!(self, SelectionStyle::MultiColumn | SelectionStyle::SingleColumn)
    }

    /// Styles that allow at most one selected item.
    pub fn is_single(self) -> bool {
        !matches!(self, SelectionStyle::MultiRow | SelectionStyle::MultiColumn)
    }
}

/// Target of a range selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeTarget {
    /// Extend over rows up to this one.
    Row(RowId),
    /// Extend over columns up to this one.
    Column(ColumnId),
}

/// Selection state.
#[derive(Debug, Default)]
pub struct SelectionModel {
    style: SelectionStyle,
    group_consistency: bool,
    rows: HashSet<RowId>,
    columns: Vec<ColumnId>,
    anchor_row: Option<RowId>,
    anchor_column: Option<ColumnId>,
    current_row: Option<RowId>,
    last_group_column: Option<ColumnId>,
    last_leaf_column: Option<ColumnId>,
    changes: Vec<(RowId, bool)>,
}

impl SelectionModel {
    /// Creates an empty selection.
    pub fn new(style: SelectionStyle, group_consistency: bool) -> Self {
        Self {
            style,
            group_consistency,
            ..Self::default()
        }
    }

    /// The selection style.
    pub fn style(&self) -> SelectionStyle {
        self.style
    }

    /// Whether group consistency repair is enabled.
    pub fn group_consistency(&self) -> bool {
        self.group_consistency
    }

    /// Returns `true` if the row is selected.
    pub fn is_row_selected(&self, id: RowId) -> bool {
        self.rows.contains(&id)
    }

    /// Returns `true` if the column is selected.
    pub fn is_column_selected(&self, id: &ColumnId) -> bool {
        self.columns.contains(id)
    }

    /// Selected rows in no particular order.
    pub fn selected_row_set(&self) -> &HashSet<RowId> {
        &self.rows
    }

    /// Selected columns in selection order.
    pub fn selected_columns(&self) -> &[ColumnId] {
        &self.columns
    }

    /// Number of selected rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    /// Anchor row.
    pub fn anchor_row(&self) -> Option<RowId> {
        self.anchor_row
    }

    /// Anchor column.
    pub fn anchor_column(&self) -> Option<&ColumnId> {
        self.anchor_column.as_ref()
    }

    /// The moving end of a range selection; the anchor when no range is
    /// being extended.
    pub fn current_row(&self) -> Option<RowId> {
        self.current_row.or(self.anchor_row)
    }

    pub(crate) fn set_style(&mut self, style: SelectionStyle) {
        self.style = style;
    }

    pub(crate) fn set_group_consistency(&mut self, enabled: bool) {
        self.group_consistency = enabled;
    }

    pub(crate) fn set_anchor(&mut self, row: Option<RowId>, column: Option<ColumnId>) {
        self.anchor_row = row;
        self.current_row = row;
        self.anchor_column = column;
    }

    pub(crate) fn set_anchor_column(&mut self, column: Option<ColumnId>) {
        self.anchor_column = column;
    }

    pub(crate) fn set_current_row(&mut self, row: Option<RowId>) {
        self.current_row = row;
    }

    /// Row flag changes recorded since the last call.
    pub(crate) fn take_changes(&mut self) -> Vec<(RowId, bool)> {
        std::mem::take(&mut self.changes)
    }

    fn select(&mut self, id: RowId) -> bool {
        let inserted = self.rows.insert(id);
        if inserted {
            self.changes.push((id, true));
        }
        inserted
    }

    fn deselect(&mut self, id: RowId) -> bool {
        let removed = self.rows.remove(&id);
        if removed {
            self.changes.push((id, false));
        }
        removed
    }

    fn deselect_all_rows(&mut self) -> Vec<RowId> {
        let previous: Vec<RowId> = self.rows.iter().copied().collect();
        for &id in &previous {
            self.deselect(id);
        }
        previous
    }

    /// Replaces the row selection.
    ///
    /// The anchor moves to the first selected row, or is cleared when `rows`
    /// is empty.
    pub(crate) fn set_selected_rows<T>(&mut self, rows: &[RowId], view: &Hierarchy<'_, T>) -> bool {
        let mut wanted = visible_unique(rows, view);
        if !self.style.is_row_based() {
            self.set_anchor(wanted.first().copied(), self.anchor_column.clone());
            return false;
        }
        if self.style.is_single() {
            wanted.truncate(1);
        }
        let start = self.changes.len();
        let keep: HashSet<RowId> = wanted.iter().copied().collect();
        let mut affected: Vec<RowId> = self
            .rows
            .iter()
            .copied()
            .filter(|id| !keep.contains(id))
            .collect();
        for &id in &affected {
            self.deselect(id);
        }
        for &id in &wanted {
            self.select(id);
        }
        self.anchor_row = wanted.first().copied();
        self.current_row = self.anchor_row;
        affected.extend(wanted);
        self.repair(&affected, view);
        self.changes.len() != start
    }

    /// Flips the selection of each row. A group parent carries along every
    /// descendant that shares its pre-toggle state.
    pub(crate) fn toggle_row_selections<T>(
        &mut self,
        rows: &[RowId],
        view: &Hierarchy<'_, T>,
    ) -> bool {
        let given = visible_unique(rows, view);
        if !self.style.is_row_based() || given.is_empty() {
            return false;
        }
        let start = self.changes.len();

        if self.style.is_single() {
            let id = given[0];
            let mut affected = Vec::new();
            if self.rows.contains(&id) {
                self.deselect(id);
            } else {
                affected = self.deselect_all_rows();
                self.select(id);
                self.anchor_row = Some(id);
                self.current_row = Some(id);
            }
            affected.push(id);
            self.repair(&affected, view);
            return self.changes.len() != start;
        }

        let mut expanded = Vec::with_capacity(given.len());
        let mut seen = HashSet::new();
        for &id in &given {
            if seen.insert(id) {
                expanded.push(id);
            }
            if view.is_parent_row(id) {
                let state = self.rows.contains(&id);
                for child in view.all_children(id) {
                    if is_visible(view, child) && self.rows.contains(&child) == state && seen.insert(child) {
                        expanded.push(child);
                    }
                }
            }
        }

        let mut first_selected = None;
        for &id in &expanded {
            if self.rows.contains(&id) {
                self.deselect(id);
            } else {
                self.select(id);
                first_selected.get_or_insert(id);
            }
        }
        if let Some(first) = first_selected {
            self.anchor_row = Some(first);
            self.current_row = Some(first);
        }
        self.repair(&expanded, view);
        self.changes.len() != start
    }

    /// Selects the visible rows between the anchor and `target`, inclusive.
    pub(crate) fn select_row_range<T>(
        &mut self,
        target: RowId,
        keep_existing: bool,
        view: &Hierarchy<'_, T>,
    ) -> bool {
        let table = view.table();
        let Some(target_pos) = table.visible_position(target) else {
            return false;
        };
        let anchor_pos = self.anchor_row.and_then(|a| table.visible_position(a));
        let Some(anchor_pos) = anchor_pos.filter(|_| !self.style.is_single()) else {
            return self.set_selected_rows(&[target], view);
        };
        if !self.style.is_row_based() {
            return false;
        }

        let start = self.changes.len();
        let (lo, hi) = (anchor_pos.min(target_pos), anchor_pos.max(target_pos));
        let range: Vec<RowId> = table.visible()[lo..=hi].to_vec();
        let mut affected = Vec::new();
        if !keep_existing {
            let keep: HashSet<RowId> = range.iter().copied().collect();
            affected = self
                .rows
                .iter()
                .copied()
                .filter(|id| !keep.contains(id))
                .collect();
            for &id in &affected {
                self.deselect(id);
            }
        }
        for &id in &range {
            self.select(id);
        }
        self.current_row = Some(target);
        affected.extend(range);
        self.repair(&affected, view);
        self.changes.len() != start
    }

    /// Selects the columns between the anchor column and `target` in layout
    /// order.
    pub(crate) fn select_column_range(
        &mut self,
        target: &ColumnId,
        keep_existing: bool,
        layout: &[ColumnId],
    ) -> bool {
        let Some(target_pos) = layout.iter().position(|c| c == target) else {
            return false;
        };
        if !self.style.is_column_based() {
            self.anchor_column = Some(target.clone());
            return false;
        }
        let anchor_pos = self
            .anchor_column
            .as_ref()
            .and_then(|a| layout.iter().position(|c| c == a))
            .filter(|_| !self.style.is_single());
        let Some(anchor_pos) = anchor_pos else {
            return self.set_selected_columns(std::slice::from_ref(target), layout);
        };

        let before = self.columns.clone();
        let (lo, hi) = (anchor_pos.min(target_pos), anchor_pos.max(target_pos));
        if !keep_existing {
            self.columns.clear();
        }
        for id in &layout[lo..=hi] {
            if !self.columns.contains(id) {
                self.columns.push(id.clone());
            }
        }
        before != self.columns
    }

    /// Replaces the column selection. The anchor column moves to the first
    /// selected column.
    pub(crate) fn set_selected_columns(&mut self, ids: &[ColumnId], layout: &[ColumnId]) -> bool {
        let mut wanted: Vec<ColumnId> = Vec::new();
        for id in ids {
            if layout.contains(id) && !wanted.contains(id) {
                wanted.push(id.clone());
            }
        }
        if let Some(first) = wanted.first() {
            self.anchor_column = Some(first.clone());
        }
        if !self.style.is_column_based() {
            return false;
        }
        if self.style.is_single() {
            wanted.truncate(1);
        }
        let changed = wanted != self.columns;
        self.columns = wanted;
        changed
    }

    /// Flips the selection of each column.
    pub(crate) fn toggle_column_selections(&mut self, ids: &[ColumnId], layout: &[ColumnId]) -> bool {
        if !self.style.is_column_based() {
            return false;
        }
        let before = self.columns.clone();
        for id in ids.iter().filter(|id| layout.contains(id)) {
            if let Some(pos) = self.columns.iter().position(|c| c == id) {
                self.columns.remove(pos);
            } else {
                if self.style.is_single() {
                    self.columns.clear();
                }
                self.columns.push(id.clone());
                self.anchor_column = Some(id.clone());
            }
        }
        before != self.columns
    }

    /// Drops a deleted or hidden row. Returns `true` if selection state
    /// changed.
    pub(crate) fn remove_row(&mut self, id: RowId) -> bool {
        let mut changed = self.deselect(id);
        if self.anchor_row == Some(id) {
            self.anchor_row = None;
            self.anchor_column = None;
            changed = true;
        }
        if self.current_row == Some(id) {
            self.current_row = None;
        }
        changed
    }

    /// Drops a removed column. Returns `true` if selection state changed.
    pub(crate) fn remove_column(&mut self, id: &ColumnId) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c != id);
        let mut changed = before != self.columns.len();
        if self.anchor_column.as_ref() == Some(id) {
            self.anchor_column = None;
            changed = true;
        }
        if self.last_group_column.as_ref() == Some(id) {
            self.last_group_column = None;
        }
        if self.last_leaf_column.as_ref() == Some(id) {
            self.last_leaf_column = None;
        }
        changed
    }

    /// Clears rows, columns and the anchor. Returns `true` if anything was
    /// selected or anchored.
    pub(crate) fn clear(&mut self) -> bool {
        let had_anchor = self.anchor_row.is_some();
        let rows = !self.deselect_all_rows().is_empty();
        let columns = !self.columns.is_empty();
        self.columns.clear();
        self.anchor_row = None;
        self.current_row = None;
        rows || columns || had_anchor
    }

    /// Clears everything without recording row changes.
    pub(crate) fn reset(&mut self) {
        self.rows.clear();
        self.columns.clear();
        self.changes.clear();
        self.anchor_row = None;
        self.anchor_column = None;
        self.current_row = None;
    }

    /// Re-runs group repair for rows whose group changed shape, for example
    /// after members were removed or hidden. Returns `true` if any row flag
    /// changed.
    pub(crate) fn repair_groups<T>(&mut self, affected: &[RowId], view: &Hierarchy<'_, T>) -> bool {
        let start = self.changes.len();
        self.repair(affected, view);
        self.changes.len() != start
    }

    /// Remembers the anchor column for the kind of row the cursor leaves.
    pub(crate) fn remember_anchor_column(&mut self, leaving_group_row: bool) {
        let column = self.anchor_column.clone();
        if leaving_group_row {
            self.last_group_column = column;
        } else {
            self.last_leaf_column = column;
        }
    }

    /// The anchor column last used on the kind of row the cursor enters.
    pub(crate) fn remembered_anchor_column(&self, entering_group_row: bool) -> Option<&ColumnId> {
        if entering_group_row {
            self.last_group_column.as_ref()
        } else {
            self.last_leaf_column.as_ref()
        }
    }

    /// Makes every group parent touched by `affected` selected exactly when
    /// all of its visible leaf rows are.
    ///
    /// Every distinct group of the affected rows is repaired, innermost
    /// first, so the order of `affected` does not matter. A parent whose
    /// leaves are all hidden keeps its state.
    fn repair<T>(&mut self, affected: &[RowId], view: &Hierarchy<'_, T>) {
        if !self.group_consistency || self.style != SelectionStyle::MultiRow {
            return;
        }
        let mut parents: Vec<(usize, RowId)> = Vec::new();
        let mut seen = HashSet::new();
        for &id in affected {
            let Some(parent) = view.group_parent_row(id) else {
                continue;
            };
            for candidate in std::iter::once(parent).chain(view.ancestor_rows(parent)) {
                if seen.insert(candidate) {
                    parents.push((view.depth(candidate), candidate));
                }
            }
        }
        parents.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, parent) in parents {
            if !is_visible(view, parent) {
                continue;
            }
            let leaves: Vec<RowId> = view
                .all_children(parent)
                .into_iter()
                .filter(|&d| is_visible(view, d) && !view.is_parent_row(d))
                .collect();
            if leaves.is_empty() {
                continue;
            }
            if leaves.iter().all(|d| self.rows.contains(d)) {
                self.select(parent);
            } else {
                self.deselect(parent);
            }
        }
    }
}

fn is_visible<T>(view: &Hierarchy<'_, T>, id: RowId) -> bool {
    view.table().get(id).is_some_and(|row| row.is_visible())
}

fn visible_unique<T>(rows: &[RowId], view: &Hierarchy<'_, T>) -> Vec<RowId> {
    let mut seen = HashSet::new();
    rows.iter()
        .copied()
        .filter(|&id| is_visible(view, id) && seen.insert(id))
        .collect()
}
