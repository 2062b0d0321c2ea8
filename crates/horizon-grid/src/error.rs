//! Error types for the grid model.

use crate::model::ColumnId;

/// Result type alias for grid operations.
pub type GridResult<T> = std::result::Result<T, GridError>;

/// Errors raised by the grid model.
///
/// These are configuration or programming errors made by the caller. The
/// model rejects the offending call and leaves its state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A column with the same id is already part of the grid.
    #[error("Duplicate column id '{0}'")]
    DuplicateColumnId(ColumnId),

    /// The referenced column is not part of the grid.
    #[error("Unknown column id '{0}'")]
    UnknownColumn(ColumnId),

    /// The referenced row no longer exists.
    #[error("Unknown or removed row")]
    UnknownRow,

    /// `enable_events(true)` was called more often than `enable_events(false)`.
    #[error("Unbalanced event suppression: events enabled more often than disabled")]
    UnbalancedEventSuppression,
}

impl GridError {
    /// Create a duplicate column error.
    pub fn duplicate_column(id: &ColumnId) -> Self {
        Self::DuplicateColumnId(id.clone())
    }

    /// Create an unknown column error.
    pub fn unknown_column(id: &ColumnId) -> Self {
        Self::UnknownColumn(id.clone())
    }
}
