//! Sort model and the row comparator.
//!
//! The comparator is a strict priority chain over the group structure:
//!
//! 1. An ancestor sorts before (or after) its descendants.
//! 2. Members of the same group compare by sort-column values.
//! 3. A group row against an ungrouped row follows the [`GroupSortPolicy`].
//! 4. Rows of different groups compare by their group parents.
//! 5. Two ungrouped rows compare directly.
//!
//! Column values fall back to the provider's natural index, and finally to
//! element identity, so distinct elements never compare equal. Binary-search
//! insertion relies on the visible sequence being ordered by this same
//! comparator.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::column::{Column, ColumnId, ColumnSet, SortDirection};
use super::hierarchy::{ancestors, is_parent_element};
use super::provider::ContentProvider;
use super::row::ElementKey;
use super::value::{compare_with, CellValue};
use crate::error::{GridError, GridResult};

/// Ordering of group rows relative to ungrouped rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroupSortPolicy {
    /// Groups always sort above ungrouped rows.
    GroupsAbove,
    /// Groups always sort below ungrouped rows.
    GroupsBelow,
    /// Ungrouped rows compare as if positioned at the group parent.
    #[default]
    Interleaved,
}

/// Active sort columns in priority order.
#[derive(Debug, Default, Clone)]
pub struct SortModel {
    active: Vec<ColumnId>,
}

impl SortModel {
    /// Creates a model with no active sort columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Active sort columns, highest priority first.
    pub fn active(&self) -> &[ColumnId] {
        &self.active
    }

    /// Returns `true` if any column is actively sorted.
    pub fn is_sorted(&self) -> bool {
        !self.active.is_empty()
    }

    /// Applies a sort request to the column set.
    ///
    /// With `toggle` the column cycles `None -> Ascending -> Descending ->
    /// None`. Without `append` every other active column is reset first. A
    /// column that ends up with direction `None` leaves the active list.
    pub(crate) fn apply(
        &mut self,
        columns: &mut ColumnSet,
        id: &ColumnId,
        toggle: bool,
        append: bool,
    ) -> GridResult<()> {
        let current = columns
            .get(id)
            .map(Column::sort_direction)
            .ok_or_else(|| GridError::unknown_column(id))?;
        let direction = if toggle { current.cycle() } else { current };

        if !append {
            for other in self.active.iter().filter(|other| *other != id) {
                if let Some(column) = columns.get_mut(other) {
                    column.set_sort(SortDirection::None, None);
                }
            }
            self.active.retain(|other| other == id);
        }

        if direction.is_active() {
            if !self.active.contains(id) {
                self.active.push(id.clone());
            }
        } else {
            self.active.retain(|other| other != id);
        }
        if let Some(column) = columns.get_mut(id) {
            column.set_sort(direction, None);
        }
        self.renumber(columns);
        Ok(())
    }

    /// Adopts the sort directions carried by newly added columns.
    pub(crate) fn adopt_initial(&mut self, columns: &mut ColumnSet, added: &[ColumnId]) {
        let mut initial: Vec<(usize, usize, ColumnId)> = added
            .iter()
            .enumerate()
            .filter_map(|(order, id)| {
                let column = columns.get(id)?;
                column.sort_direction().is_active().then(|| {
                    let sequence = column.sort_sequence().unwrap_or(usize::MAX);
                    (sequence, order, id.clone())
                })
            })
            .collect();
        initial.sort();
        for (_, _, id) in initial {
            if !self.active.contains(&id) {
                self.active.push(id);
            }
        }
        self.renumber(columns);
    }

    /// Drops removed columns from the active list. Returns `true` if the
    /// active list changed.
    pub(crate) fn remove(&mut self, columns: &mut ColumnSet, ids: &[ColumnId]) -> bool {
        let before = self.active.len();
        self.active.retain(|id| !ids.contains(id));
        let changed = self.active.len() != before;
        if changed {
            self.renumber(columns);
        }
        changed
    }

    /// Snapshot of the active sort keys.
    pub fn keys(&self, columns: &ColumnSet) -> Vec<SortKey> {
        self.active
            .iter()
            .filter_map(|id| columns.get(id))
            .filter(|c| c.sort_direction().is_active())
            .map(|c| SortKey {
                descending: c.sort_direction() == SortDirection::Descending,
                column: c.clone(),
            })
            .collect()
    }

    fn renumber(&self, columns: &mut ColumnSet) {
        for (sequence, id) in self.active.iter().enumerate() {
            if let Some(column) = columns.get_mut(id) {
                let direction = column.sort_direction();
                column.set_sort(direction, Some(sequence));
            }
        }
    }
}

/// One active sort column.
#[derive(Debug, Clone)]
pub struct SortKey {
    column: Column,
    descending: bool,
}

impl SortKey {
    /// The sorted column.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Returns `true` for a descending key.
    pub fn is_descending(&self) -> bool {
        self.descending
    }
}

/// Total order over elements under the current sort configuration.
pub struct RowComparator<'a, T> {
    keys: Vec<SortKey>,
    content: &'a dyn ContentProvider<T>,
    parents_above_children: bool,
    policy: GroupSortPolicy,
}

impl<'a, T> RowComparator<'a, T> {
    /// Creates a comparator over the given keys.
    pub fn new(
        keys: Vec<SortKey>,
        content: &'a dyn ContentProvider<T>,
        parents_above_children: bool,
        policy: GroupSortPolicy,
    ) -> Self {
        Self {
            keys,
            content,
            parents_above_children,
            policy,
        }
    }

    /// Compares two rows by their elements.
    pub fn compare(&self, a: &Arc<T>, b: &Arc<T>) -> Ordering {
        if Arc::ptr_eq(a, b) {
            return Ordering::Equal;
        }
        let path_a = self.path(a);
        let path_b = self.path(b);
        let key_a = ElementKey::of(a);
        let key_b = ElementKey::of(b);

        // Rule 1: ancestry.
        let ancestor_first = if self.parents_above_children {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        if path_b.iter().any(|p| ElementKey::of(p) == key_a) {
            return ancestor_first;
        }
        if path_a.iter().any(|p| ElementKey::of(p) == key_b) {
            return ancestor_first.reverse();
        }

        let shared = path_a
            .iter()
            .zip(&path_b)
            .take_while(|(x, y)| Arc::ptr_eq(x, y))
            .count();

        // Rule 2: same group, compare the members that diverge.
        if shared > 0 {
            return self.compare_total(&path_a[shared], &path_b[shared]);
        }

        let root_a = &path_a[0];
        let root_b = &path_b[0];
        let grouped_a = path_a.len() > 1 || is_parent_element(self.content, root_a);
        let grouped_b = path_b.len() > 1 || is_parent_element(self.content, root_b);

        match (grouped_a, grouped_b) {
            // Rule 3: group against ungrouped row.
            (true, false) => self.group_against_plain(root_a, b),
            (false, true) => self.group_against_plain(root_b, a).reverse(),
            // Rule 4: different groups compare their parents.
            (true, true) => self.compare_total(root_a, root_b),
            // Rule 5: ordinary rows.
            (false, false) => self.compare_total(a, b),
        }
    }

    /// Compares two elements by the sort-column values, then natural index.
    pub fn compare_elements(&self, a: &T, b: &T) -> Ordering {
        for key in &self.keys {
            let left = self.value(&key.column, a);
            let right = self.value(&key.column, b);
            let mut ordering = compare_with(key.column.comparator(), &left, &right);
            if key.descending {
                ordering = ordering.reverse();
            }
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        self.content
            .natural_index(a)
            .cmp(&self.content.natural_index(b))
    }

    fn compare_total(&self, a: &Arc<T>, b: &Arc<T>) -> Ordering {
        self.compare_elements(a, b)
            .then_with(|| ElementKey::of(a).cmp(&ElementKey::of(b)))
    }

    fn group_against_plain(&self, group_root: &Arc<T>, plain: &Arc<T>) -> Ordering {
        match self.policy {
            GroupSortPolicy::GroupsAbove => Ordering::Less,
            GroupSortPolicy::GroupsBelow => Ordering::Greater,
            GroupSortPolicy::Interleaved => self.compare_total(group_root, plain),
        }
    }

    fn value(&self, column: &Column, element: &T) -> CellValue {
        if is_parent_element(self.content, element) && !self.content.owns_column(column, element) {
            return CellValue::None;
        }
        self.content.value(column, element)
    }

    /// Root-first chain of ancestors ending with `element`.
    fn path(&self, element: &Arc<T>) -> Vec<Arc<T>> {
        let mut path = ancestors(self.content, element);
        path.reverse();
        path.push(element.clone());
        path
    }
}
