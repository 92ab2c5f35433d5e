//! Configuration error types

/// Errors raised while building a grid from caller-supplied columns and config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two column descriptors share the same id.
    #[error("Duplicate column id '{0}'")]
    DuplicateColumn(String),

    /// No column descriptors were supplied.
    #[error("A table needs at least one column")]
    EmptyColumns,

    /// The configured default page size is zero.
    #[error("Page size must be positive")]
    ZeroPageSize,
}
