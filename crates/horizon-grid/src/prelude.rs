//! Prelude module for Horizon Grid.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use horizon_grid::prelude::*;
//! ```
//!
//! This provides access to:
//! - The model (`GridModel`, `GridConfig`, `GridError`)
//! - Host integration traits (`ContentProvider`, `LabelProvider`)
//! - Columns, filters and selection styles
//! - Viewport geometry (`Point`, `Size`, `Rect`)

// ============================================================================
// Model
// ============================================================================

pub use crate::config::GridConfig;
pub use crate::error::{GridError, GridResult};
pub use crate::model::{EventSuppression, GridModel, Navigation};

// ============================================================================
// Host Integration
// ============================================================================

pub use crate::model::{CellValue, ContentProvider, LabelProvider, Row, RowFactory, RowId};

// ============================================================================
// Columns, Sorting and Filtering
// ============================================================================

pub use crate::model::{
    Column, ColumnId, Filter, FilterId, GroupSortPolicy, PredicateFilter, SortDirection,
    TextCollator, locale_comparator,
};

// ============================================================================
// Selection
// ============================================================================

pub use crate::model::{RangeTarget, SelectionStyle};

// ============================================================================
// Signals
// ============================================================================

pub use horizon_grid_core::{ConnectionId, Signal};

// ============================================================================
// Viewport
// ============================================================================

pub use crate::viewport::{CellRange, ColumnHit, Point, Rect, RowHit, Size};
