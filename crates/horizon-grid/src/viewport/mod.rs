//! Scroll state, visible ranges and hit-testing.
//!
//! The viewport knows nothing about elements. It reads row heights and
//! column widths through [`LayoutSource`], which the grid model implements
//! over its visible partition and column layout.

mod geometry;
#[allow(clippy::module_inception)]
mod viewport;

pub use geometry::{Point, Rect, Size};
pub use viewport::{CellRange, ColumnHit, LayoutSource, RowHit, Viewport, VisibleRange};
