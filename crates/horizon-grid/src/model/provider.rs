//! Capability interfaces the host implements to feed the grid.
//!
//! Elements are shared as `Arc<T>` and identified by allocation, not by
//! value. A provider that returns parents or children must hand back the
//! same `Arc` handles that were added to the grid, otherwise the grid sees
//! them as unrelated elements.

use std::sync::Arc;

use super::column::Column;
use super::row::Row;
use super::value::CellValue;

/// Supplies hierarchy, collapse state and cell values for elements.
pub trait ContentProvider<T>: Send + Sync {
    /// Returns the parent of `element`, if it is a child.
    fn parent(&self, element: &T) -> Option<Arc<T>>;

    /// Returns the children of `element`.
    ///
    /// `None` marks a leaf. `Some` (even when empty) marks a group-capable
    /// parent.
    fn children(&self, element: &T) -> Option<Vec<Arc<T>>>;

    /// Returns `true` if the children of `element` are currently collapsed.
    fn is_collapsed(&self, element: &T) -> bool;

    /// Returns the raw value of `element` in `column`.
    fn value(&self, column: &Column, element: &T) -> CellValue;

    /// Returns a stable identifier for diagnostics.
    fn element_id(&self, element: &T) -> String;

    /// Returns the stable tiebreaker used when no sort key separates rows.
    fn natural_index(&self, element: &T) -> i64;

    /// Returns `false` for columns a parent element does not carry a value
    /// for. Parent rows yield no value in those columns when sorting.
    fn owns_column(&self, column: &Column, element: &T) -> bool {
        let _ = (column, element);
        true
    }

    /// Called when the set of group-by columns changes.
    fn on_group_by_changed(&self, columns: &[super::ColumnId]) {
        let _ = columns;
    }
}

/// Supplies display text and sizing hints.
pub trait LabelProvider<T>: Send + Sync {
    /// Returns the display text of `element` in `column`.
    fn text(&self, column: &Column, element: &T) -> String;

    /// Returns the row height for `element`, or `-1` to use the grid default.
    fn default_row_height(&self, element: &T) -> i32 {
        let _ = element;
        -1
    }

    /// Returns `true` if `row` should use the other banding colour than
    /// `previous`.
    fn should_alternate_background(&self, previous: Option<&Row<T>>, row: &Row<T>) -> bool {
        let _ = (previous, row);
        true
    }

    /// Returns the rendered width of `text` in pixels.
    ///
    /// Used to size the row-number gutter. The default assumes a fixed
    /// advance of 8 pixels per character.
    fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * 8
    }
}

/// Creates the row wrapper for a newly added element.
pub trait RowFactory<T>: Send + Sync {
    /// Creates a row for `element`.
    fn create_row(&self, element: Arc<T>) -> Row<T>;
}

/// The row factory used when the host does not install one.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRowFactory;

impl<T> RowFactory<T> for DefaultRowFactory {
    fn create_row(&self, element: Arc<T>) -> Row<T> {
        Row::new(element)
    }
}
