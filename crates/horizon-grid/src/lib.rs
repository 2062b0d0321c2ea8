//! Horizon Grid - row and column state for virtualized data grids.
//!
//! This crate holds everything a grid view needs to know about its rows and
//! columns, without drawing anything:
//!
//! - **Model**: rows wrapping host elements, sorted and filtered, with
//!   optional parent/child grouping ([`model`])
//! - **Selection**: row and column selection styles, anchors, ranges and
//!   keyboard navigation
//! - **Viewport**: scroll state, visible cell ranges and hit testing over
//!   variable row heights ([`viewport`])
//! - **Configuration**: serializable grid options ([`GridConfig`])
//!
//! Change notification and logging live in [`horizon_grid_core`] and are
//! re-exported here.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use horizon_grid::prelude::*;
//!
//! let mut grid = GridModel::new(content, labels, GridConfig::default());
//! grid.add_columns([Column::new("name", "Name")])?;
//! grid.set_client_size(Size::new(800, 600));
//! grid.add_elements(elements);
//!
//! let range = grid.visible_cell_range();
//! ```

pub mod config;
mod error;
pub mod model;
pub mod prelude;
pub mod viewport;

pub use config::GridConfig;
pub use error::{GridError, GridResult};
pub use horizon_grid_core::{logging, signal, ConnectionId, LogOnce, PerfSpan, Signal, TreeStyle};
pub use model::GridModel;
