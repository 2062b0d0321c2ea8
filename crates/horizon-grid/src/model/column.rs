//! Column descriptors and the column set.

use std::fmt;

use super::value::{default_comparator, ValueComparator};

/// Unique identifier of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(String);

impl ColumnId {
    /// Creates a column id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ColumnId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    /// The column does not take part in sorting.
    #[default]
    None,
    /// Smallest values first.
    Ascending,
    /// Largest values first.
    Descending,
}

impl SortDirection {
    /// Returns the next direction in the `None -> Ascending -> Descending`
    /// cycle.
    pub fn cycle(self) -> Self {
        match self {
            SortDirection::None => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::None,
        }
    }

    /// Returns `true` for `Ascending` and `Descending`.
    pub fn is_active(self) -> bool {
        self != SortDirection::None
    }
}

/// A column descriptor.
#[derive(Clone)]
pub struct Column {
    id: ColumnId,
    caption: String,
    width: u32,
    visible: bool,
    pinned: bool,
    sort_direction: SortDirection,
    sort_sequence: Option<usize>,
    comparator: ValueComparator,
}

impl Column {
    /// Default width for new columns.
    pub const DEFAULT_WIDTH: u32 = 100;

    /// Creates a visible, unpinned, unsorted column.
    pub fn new(id: impl Into<ColumnId>, caption: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            caption: caption.into(),
            width: Self::DEFAULT_WIDTH,
            visible: true,
            pinned: false,
            sort_direction: SortDirection::None,
            sort_sequence: None,
            comparator: default_comparator(),
        }
    }

    /// Sets the width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Sets the visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the pinned flag.
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Sets the initial sort direction.
    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = direction;
        self
    }

    /// Sets the initial sort priority among columns added together.
    pub fn with_sort_sequence(mut self, sequence: usize) -> Self {
        self.sort_sequence = Some(sequence);
        self
    }

    /// Replaces the value comparator.
    pub fn with_comparator(mut self, comparator: ValueComparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Returns the id.
    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    /// Returns the caption.
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Returns the configured width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns `true` if the column is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns `true` if the column is pinned.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Returns the sort direction.
    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Returns the sort priority, if the column is actively sorted.
    pub fn sort_sequence(&self) -> Option<usize> {
        self.sort_sequence
    }

    /// Returns the value comparator.
    pub fn comparator(&self) -> &ValueComparator {
        &self.comparator
    }

    pub(crate) fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_pinned(&mut self, pinned: bool) {
        self.pinned = pinned;
    }

    pub(crate) fn set_sort(&mut self, direction: SortDirection, sequence: Option<usize>) {
        self.sort_direction = direction;
        self.sort_sequence = sequence;
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("caption", &self.caption)
            .field("width", &self.width)
            .field("visible", &self.visible)
            .field("pinned", &self.pinned)
            .field("sort_direction", &self.sort_direction)
            .field("sort_sequence", &self.sort_sequence)
            .finish_non_exhaustive()
    }
}

/// All columns of a grid plus the derived visible layout.
///
/// `all` holds every column in insertion order (adjusted by moves). The
/// visible layout lists visible pinned columns first, then the visible
/// scrollable ones, and is rebuilt after every structural change.
#[derive(Debug, Default)]
pub struct ColumnSet {
    all: Vec<Column>,
    visible: Vec<ColumnId>,
    pinned_count: usize,
    group_by: Vec<ColumnId>,
}

impl ColumnSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every column.
    pub fn all(&self) -> &[Column] {
        &self.all
    }

    /// Returns the ids of the visible columns in layout order.
    pub fn visible(&self) -> &[ColumnId] {
        &self.visible
    }

    /// Number of visible pinned columns. They occupy the front of the layout.
    pub fn pinned_count(&self) -> usize {
        self.pinned_count
    }

    /// Returns the group-by columns in grouping order.
    pub fn group_by(&self) -> &[ColumnId] {
        &self.group_by
    }

    /// Returns `true` if no columns exist.
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Returns `true` if a column with `id` exists.
    pub fn contains(&self, id: &ColumnId) -> bool {
        self.position(id).is_some()
    }

    /// Looks up a column.
    pub fn get(&self, id: &ColumnId) -> Option<&Column> {
        self.all.iter().find(|c| &c.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.all.iter_mut().find(|c| &c.id == id)
    }

    /// Index of the column in [`all`](Self::all).
    pub fn position(&self, id: &ColumnId) -> Option<usize> {
        self.all.iter().position(|c| &c.id == id)
    }

    /// Index of the column in the visible layout.
    pub fn layout_index(&self, id: &ColumnId) -> Option<usize> {
        self.visible.iter().position(|c| c == id)
    }

    /// Returns the visible column at a layout index.
    pub fn layout_column(&self, index: usize) -> Option<&Column> {
        self.visible.get(index).and_then(|id| self.get(id))
    }

    /// Iterates the visible columns in layout order.
    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> {
        self.visible.iter().filter_map(|id| self.get(id))
    }

    pub(crate) fn push(&mut self, column: Column) {
        self.all.push(column);
    }

    /// Removes the given columns and returns the ones that existed.
    pub(crate) fn remove(&mut self, ids: &[ColumnId]) -> Vec<Column> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.all.len());
        for column in self.all.drain(..) {
            if ids.contains(&column.id) {
                removed.push(column);
            } else {
                kept.push(column);
            }
        }
        self.all = kept;
        self.group_by.retain(|id| !ids.contains(id));
        removed
    }

    /// Moves a column within [`all`](Self::all).
    pub(crate) fn move_to(&mut self, from: usize, to: usize) {
        let column = self.all.remove(from);
        let to = to.min(self.all.len());
        self.all.insert(to, column);
    }

    /// Adds `id` to the group-by set. Returns `false` if already present.
    pub(crate) fn add_group_by(&mut self, id: &ColumnId) -> bool {
        if self.group_by.contains(id) {
            return false;
        }
        self.group_by.push(id.clone());
        true
    }

    /// Removes `id` from the group-by set. Returns `false` if absent.
    pub(crate) fn remove_group_by(&mut self, id: &ColumnId) -> bool {
        let before = self.group_by.len();
        self.group_by.retain(|g| g != id);
        self.group_by.len() != before
    }

    pub(crate) fn take_group_by(&mut self) -> Vec<ColumnId> {
        std::mem::take(&mut self.group_by)
    }

    /// Rebuilds the visible layout from `all`.
    pub(crate) fn rebuild_visible(&mut self) {
        let pinned = self.all.iter().filter(|c| c.visible && c.pinned);
        let body = self.all.iter().filter(|c| c.visible && !c.pinned);
        self.visible = pinned.chain(body).map(|c| c.id.clone()).collect();
        self.pinned_count = self.all.iter().filter(|c| c.visible && c.pinned).count();
    }
}
