//! Validation error types

/// A malformed mutation input.
///
/// These never reach the user: the component that detects one turns the
/// mutation into a no-op and logs the reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The drag started and ended on the same column.
    #[error("Source and target column are the same ('{0}')")]
    SameColumn(String),

    /// The reorder intent is missing its source or target id.
    #[error("Reorder intent is missing a column id")]
    MissingColumnId,

    /// The id is not part of the current column order.
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The column cannot be dragged.
    #[error("Column '{0}' is not reorderable")]
    NotReorderable(String),

    /// The move would shift a column that must keep its position.
    #[error("Moving the column would displace fixed column '{0}'")]
    WouldDisplaceFixedColumn(String),

    /// A pagination update with a zero page size.
    #[error("Page size must be positive")]
    InvalidPageSize,

    /// An update function refused to produce a value.
    #[error("Update rejected: {0}")]
    Rejected(String),
}

impl ValidationError {
    /// Creates a rejection with the given reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }
}
