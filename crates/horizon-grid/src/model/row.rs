//! Row wrappers and the row table.
//!
//! Rows live in a [`SlotMap`] arena keyed by [`RowId`]. The table keeps the
//! identity map from element to row plus the visible and hidden partitions.
//! Every row is in exactly one partition once it has been placed.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use slotmap::{new_key_type, SlotMap};

use super::filter::FilterId;

new_key_type! {
    /// Stable handle of a row. Never reused for another element while the
    /// row exists.
    pub struct RowId;
}

/// Identity key of an element: the address of its allocation.
///
/// Two structurally equal elements in different allocations are different
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(usize);

impl ElementKey {
    /// Key of a shared element handle.
    pub fn of<T>(element: &Arc<T>) -> Self {
        Self(Arc::as_ptr(element) as usize)
    }

    /// Key of a borrowed element. Equal to [`of`](Self::of) for a reference
    /// obtained from the same `Arc`.
    pub fn from_ref<T>(element: &T) -> Self {
        Self(element as *const T as usize)
    }
}

/// The model's wrapper around one element.
#[derive(Debug)]
pub struct Row<T> {
    element: Arc<T>,
    visible: bool,
    selected: bool,
    pinned: bool,
    height: u32,
    visible_index: Option<usize>,
    hidden_index: Option<usize>,
    highlights: Vec<FilterId>,
    alternate_background: bool,
}

impl<T> Row<T> {
    /// Creates a hidden, unplaced row for `element`.
    pub fn new(element: Arc<T>) -> Self {
        Self {
            element,
            visible: false,
            selected: false,
            pinned: false,
            height: 0,
            visible_index: None,
            hidden_index: None,
            highlights: Vec::new(),
            alternate_background: false,
        }
    }

    /// Returns the wrapped element.
    pub fn element(&self) -> &Arc<T> {
        &self.element
    }

    /// Returns the identity key of the wrapped element.
    pub fn key(&self) -> ElementKey {
        ElementKey::of(&self.element)
    }

    /// Returns `true` if the row is in the visible sequence.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` if the row is selected.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns `true` if the row is pinned.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Returns the row height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Index in the visible sequence as of the last reindex.
    pub fn visible_index(&self) -> Option<usize> {
        self.visible_index
    }

    /// Index in the hidden collection as of the last reindex.
    pub fn hidden_index(&self) -> Option<usize> {
        self.hidden_index
    }

    /// Highlighting filters that matched this row.
    pub fn highlights(&self) -> &[FilterId] {
        &self.highlights
    }

    /// Returns `true` if any highlighting filter matched.
    pub fn is_highlighted(&self) -> bool {
        !self.highlights.is_empty()
    }

    /// Banding flag computed by the last reindex.
    pub fn alternate_background(&self) -> bool {
        self.alternate_background
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    pub(crate) fn set_highlights(&mut self, highlights: Vec<FilterId>) {
        self.highlights = highlights;
    }
}

/// Owns every row and the visible/hidden partition.
#[derive(Debug)]
pub struct RowTable<T> {
    rows: SlotMap<RowId, Row<T>>,
    by_element: HashMap<ElementKey, RowId>,
    visible: Vec<RowId>,
    hidden: Vec<RowId>,
    visible_height: i64,
    stale: bool,
}

impl<T> Default for RowTable<T> {
    fn default() -> Self {
        Self {
            rows: SlotMap::with_key(),
            by_element: HashMap::new(),
            visible: Vec::new(),
            hidden: Vec::new(),
            visible_height: 0,
            stale: false,
        }
    }
}

impl<T> RowTable<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row.
    pub fn get(&self, id: RowId) -> Option<&Row<T>> {
        self.rows.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: RowId) -> Option<&mut Row<T>> {
        self.rows.get_mut(id)
    }

    /// Returns `true` if the row exists.
    pub fn contains(&self, id: RowId) -> bool {
        self.rows.contains_key(id)
    }

    /// Returns the row wrapping `element`.
    pub fn row_of(&self, element: &T) -> Option<RowId> {
        self.by_element.get(&ElementKey::from_ref(element)).copied()
    }

    /// Returns the element wrapped by `id`.
    pub fn element(&self, id: RowId) -> Option<&Arc<T>> {
        self.rows.get(id).map(|row| &row.element)
    }

    /// Size of the identity map.
    pub fn identity_len(&self) -> usize {
        self.by_element.len()
    }

    /// The visible sequence in sort order.
    pub fn visible(&self) -> &[RowId] {
        &self.visible
    }

    /// The hidden collection.
    pub fn hidden(&self) -> &[RowId] {
        &self.hidden
    }

    /// Sum of the heights of visible rows.
    pub fn visible_height(&self) -> i64 {
        self.visible_height
    }

    /// Iterates all rows.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row<T>)> {
        self.rows.iter()
    }

    /// Returns `true` if cached indices are out of date.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Current position of `id` in the visible sequence.
    ///
    /// Uses the cached index while it is current and falls back to a scan
    /// between a mutation and the next reindex.
    pub fn visible_position(&self, id: RowId) -> Option<usize> {
        let row = self.rows.get(id)?;
        if !row.visible {
            return None;
        }
        if let Some(index) = row.visible_index {
            if !self.stale && self.visible.get(index) == Some(&id) {
                return Some(index);
            }
        }
        self.visible.iter().position(|&v| v == id)
    }

    /// Registers a new, unplaced row. Returns `None` if the element already
    /// has a row.
    pub(crate) fn insert(&mut self, mut row: Row<T>) -> Option<RowId> {
        let key = row.key();
        if self.by_element.contains_key(&key) {
            return None;
        }
        row.visible = false;
        row.visible_index = None;
        row.hidden_index = None;
        let id = self.rows.insert(row);
        self.by_element.insert(key, id);
        Some(id)
    }

    /// Places a row into the visible sequence at `index`.
    pub(crate) fn place_visible(&mut self, id: RowId, index: usize) {
        if let Some(row) = self.rows.get_mut(id) {
            row.visible = true;
            row.hidden_index = None;
            self.visible_height += i64::from(row.height);
            let index = index.min(self.visible.len());
            self.visible.insert(index, id);
            self.stale = true;
        }
    }

    /// Places a contiguous block of rows into the visible sequence.
    pub(crate) fn splice_visible(&mut self, index: usize, ids: &[RowId]) {
        let index = index.min(self.visible.len());
        for &id in ids {
            if let Some(row) = self.rows.get_mut(id) {
                row.visible = true;
                row.hidden_index = None;
                self.visible_height += i64::from(row.height);
            }
        }
        self.visible.splice(index..index, ids.iter().copied());
        self.stale = true;
    }

    /// Places a row into the hidden collection.
    pub(crate) fn place_hidden(&mut self, id: RowId) {
        if let Some(row) = self.rows.get_mut(id) {
            row.visible = false;
            row.visible_index = None;
            self.hidden.push(id);
            self.stale = true;
        }
    }

    /// Takes a row out of the visible sequence, returning its old position.
    pub(crate) fn take_visible(&mut self, id: RowId) -> Option<usize> {
        let position = self.visible_position(id)?;
        self.visible.remove(position);
        if let Some(row) = self.rows.get_mut(id) {
            row.visible = false;
            row.visible_index = None;
            self.visible_height -= i64::from(row.height);
        }
        self.stale = true;
        Some(position)
    }

    /// Takes a batch of rows out of the visible sequence in one pass.
    pub(crate) fn take_visible_batch(&mut self, ids: &HashSet<RowId>) {
        self.visible.retain(|id| !ids.contains(id));
        for &id in ids {
            if let Some(row) = self.rows.get_mut(id) {
                if row.visible {
                    row.visible = false;
                    row.visible_index = None;
                    self.visible_height -= i64::from(row.height);
                }
            }
        }
        self.stale = true;
    }

    /// Takes a row out of the hidden collection.
    pub(crate) fn take_hidden(&mut self, id: RowId) -> bool {
        let cached = self
            .rows
            .get(id)
            .and_then(|row| row.hidden_index)
            .filter(|&i| !self.stale && self.hidden.get(i) == Some(&id));
        let position = cached.or_else(|| self.hidden.iter().position(|&h| h == id));
        match position {
            Some(position) => {
                self.hidden.remove(position);
                if let Some(row) = self.rows.get_mut(id) {
                    row.hidden_index = None;
                }
                self.stale = true;
                true
            }
            None => false,
        }
    }

    /// Takes a batch of rows out of the hidden collection in one pass.
    pub(crate) fn take_hidden_batch(&mut self, ids: &HashSet<RowId>) {
        self.hidden.retain(|id| !ids.contains(id));
        for &id in ids {
            if let Some(row) = self.rows.get_mut(id) {
                row.hidden_index = None;
            }
        }
        self.stale = true;
    }

    /// Deletes rows entirely. Returns the removed rows.
    pub(crate) fn remove_batch(&mut self, ids: &HashSet<RowId>) -> Vec<Row<T>> {
        self.visible.retain(|id| !ids.contains(id));
        self.hidden.retain(|id| !ids.contains(id));
        let mut removed = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(row) = self.rows.remove(id) {
                if row.visible {
                    self.visible_height -= i64::from(row.height);
                }
                self.by_element.remove(&row.key());
                removed.push(row);
            }
        }
        self.stale = true;
        removed
    }

    /// Changes a row's height, keeping the visible height total current.
    /// Returns the change in visible height.
    pub(crate) fn set_height(&mut self, id: RowId, height: u32) -> i64 {
        match self.rows.get_mut(id) {
            Some(row) => {
                let delta = i64::from(height) - i64::from(row.height);
                row.height = height;
                if row.visible {
                    self.visible_height += delta;
                    delta
                } else {
                    0
                }
            }
            None => 0,
        }
    }

    /// Removes every row.
    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.by_element.clear();
        self.visible.clear();
        self.hidden.clear();
        self.visible_height = 0;
        self.stale = false;
    }

    /// Binary search for the insertion index of `element` in the visible
    /// sequence. Equal elements insert after existing ones.
    pub fn insertion_index<F>(&self, element: &Arc<T>, mut compare: F) -> usize
    where
        F: FnMut(&Arc<T>, &Arc<T>) -> Ordering,
    {
        let rows = &self.rows;
        self.visible.partition_point(|&id| match rows.get(id) {
            Some(row) => compare(&row.element, element) != Ordering::Greater,
            None => true,
        })
    }

    /// Stable sort of the visible sequence.
    pub(crate) fn sort_visible<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Arc<T>, &Arc<T>) -> Ordering,
    {
        let rows = &self.rows;
        self.visible.sort_by(|&a, &b| match (rows.get(a), rows.get(b)) {
            (Some(a), Some(b)) => compare(&a.element, &b.element),
            _ => Ordering::Equal,
        });
        self.stale = true;
    }

    /// Stable sort of an arbitrary list of row ids.
    pub(crate) fn sort_ids<F>(&self, ids: &mut [RowId], mut compare: F)
    where
        F: FnMut(&Arc<T>, &Arc<T>) -> Ordering,
    {
        let rows = &self.rows;
        ids.sort_by(|&a, &b| match (rows.get(a), rows.get(b)) {
            (Some(a), Some(b)) => compare(&a.element, &b.element),
            _ => Ordering::Equal,
        });
    }

    /// Assigns contiguous indices to both partitions and recomputes banding.
    ///
    /// `flip` decides whether the band toggles between the previous visible
    /// row and the current one.
    pub(crate) fn reindex<F>(&mut self, mut flip: F)
    where
        F: FnMut(Option<&Row<T>>, &Row<T>) -> bool,
    {
        let mut bands = Vec::with_capacity(self.visible.len());
        let mut band = false;
        let mut previous: Option<&Row<T>> = None;
        for &id in &self.visible {
            let Some(row) = self.rows.get(id) else {
                bands.push(band);
                continue;
            };
            if previous.is_some() && flip(previous, row) {
                band = !band;
            }
            bands.push(band);
            previous = Some(row);
        }

        for (index, (&id, band)) in self.visible.iter().zip(bands).enumerate() {
            if let Some(row) = self.rows.get_mut(id) {
                row.visible_index = Some(index);
                row.hidden_index = None;
                row.alternate_background = band;
            }
        }
        for (index, &id) in self.hidden.iter().enumerate() {
            if let Some(row) = self.rows.get_mut(id) {
                row.hidden_index = Some(index);
                row.visible_index = None;
                row.alternate_background = false;
            }
        }
        self.stale = false;
    }
}
