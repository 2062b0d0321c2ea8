//! Logging and debugging facilities for Horizon Grid.
//!
//! This module provides:
//! - Target names for filtering the grid's `tracing` output by subsystem
//! - Performance tracing hooks for profiling whole-model operations
//! - [`LogOnce`], a de-duplicating gate for warnings that would otherwise
//!   repeat on every frame or every call
//!
//! # Tracing Integration
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_grid::model=debug")
//!     .init();
//! ```

use std::collections::HashSet;

use parking_lot::Mutex;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Grid orchestration: element lifecycle, reindexing, event batching.
    pub const MODEL: &str = "horizon_grid::model";
    /// Sort model and row comparator.
    pub const SORT: &str = "horizon_grid::sort";
    /// Filter pipeline.
    pub const FILTER: &str = "horizon_grid::filter";
    /// Selection model.
    pub const SELECTION: &str = "horizon_grid::selection";
    /// Viewport windowing and hit-testing.
    pub const VIEWPORT: &str = "horizon_grid::viewport";
    /// Signal/slot system.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Performance spans.
    pub const PERF: &str = "horizon_grid::perf";
}

/// Style options for tree-shaped debug output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

impl TreeStyle {
    /// Returns the (branch, last branch, vertical, blank) prefixes for the style.
    pub fn prefixes(self) -> (&'static str, &'static str, &'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|-- ", "`-- ", "|   ", "    "),
            TreeStyle::Unicode => ("├── ", "└── ", "│   ", "    "),
            TreeStyle::Compact => ("", "", "", ""),
        }
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_grid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Remembers which keys have already been logged.
///
/// A host that drives the grid from a render loop can hit the same failure on
/// every frame. Gate the log call with [`LogOnce::first`] so each distinct
/// failure is reported once.
///
/// ```
/// use horizon_grid_core::LogOnce;
///
/// let once = LogOnce::new();
/// for _ in 0..3 {
///     if once.first("missing-row:42") {
///         tracing::warn!("row 42 is missing");
///     }
/// }
/// assert_eq!(once.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct LogOnce {
    seen: Mutex<HashSet<String>>,
}

impl LogOnce {
    /// Creates an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time `key` is seen, `false` afterwards.
    pub fn first(&self, key: impl Into<String>) -> bool {
        self.seen.lock().insert(key.into())
    }

    /// Number of distinct keys logged so far.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// Returns `true` if nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }

    /// Forgets every key, re-arming the gate.
    pub fn reset(&self) {
        self.seen.lock().clear();
    }
}
