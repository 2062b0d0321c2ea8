//! Row and column state for virtualized data grids.
//!
//! The grid does not own the displayed data. The host supplies elements as
//! `Arc<T>` handles together with a [`ContentProvider`] that answers
//! structural questions (parent, children, collapsed) and yields cell values,
//! and a [`LabelProvider`] that yields display text and row heights. The
//! model wraps each element in a [`Row`] and keeps:
//!
//! - an identity map from element to row;
//! - the visible rows, ordered by the active sort;
//! - the rows hidden by filters;
//! - the columns, the sort and group-by lists, the filter pipeline and the
//!   selection.
//!
//! # Core Types
//!
//! - [`GridModel`]: the orchestrator and only mutation entry point
//! - [`Column`] / [`ColumnSet`]: column definitions and the visible layout
//! - [`SortModel`] / [`RowComparator`]: multi-column, group-aware ordering
//! - [`Filter`] / [`FilterModel`]: the AND-combined filter pipeline
//! - [`SelectionModel`]: row and column selection with group consistency
//! - [`GridSignals`]: change notifications
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_grid::prelude::*;
//!
//! let mut grid = GridModel::new(Arc::new(MyContent), Arc::new(MyLabels), GridConfig::default());
//! grid.add_columns([Column::new("surname", "Surname"), Column::new("age", "Age")])?;
//! grid.signals().model_changed.connect(|_| println!("model changed"));
//!
//! grid.add_elements(people);
//! grid.sort(&"surname".into(), true, false, true)?;
//! grid.add_filter(PredicateFilter::new("adults", |p: &Person| p.age >= 18));
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐  elements  ┌─────────────┐   signals   ┌─────────────┐
//! │    Host     │───────────>│  GridModel  │────────────>│    View     │
//! │ (providers) │<───────────│             │<────────────│ (Viewport)  │
//! └─────────────┘   values   └─────────────┘  geometry   └─────────────┘
//!                                   │
//!            ┌──────────┬───────────┼───────────┬────────────┐
//!            ▼          ▼           ▼           ▼            ▼
//!        RowTable   ColumnSet   SortModel   FilterModel  SelectionModel
//! ```

mod column;
mod debug;
mod filter;
mod grid;
mod hierarchy;
mod provider;
mod row;
mod selection;
mod signals;
mod sort;
mod value;

pub use column::{Column, ColumnId, ColumnSet, SortDirection};
pub use debug::{GridDebug, GridDebugOptions};
pub use filter::{CollapsedGroupFilter, Filter, FilterId, FilterModel, FilterOutcome, Predicate, PredicateFilter};
pub use grid::{EventSuppression, GridModel, Navigation};
pub use hierarchy::{
    ancestors, descendants, group_owner, is_child_element, is_parent_element, whole_group, Hierarchy,
};
pub use provider::{ContentProvider, DefaultRowFactory, LabelProvider, RowFactory};
pub use row::{ElementKey, Row, RowId, RowTable};
pub use selection::{RangeTarget, SelectionModel, SelectionStyle};
pub use signals::GridSignals;
pub use sort::{GroupSortPolicy, RowComparator, SortKey, SortModel};
pub use value::{
    compare_cell_values, compare_text, default_comparator, locale_comparator, CellValue, TextCollator,
    ValueComparator,
};
