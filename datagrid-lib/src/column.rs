//! Table identity and static column descriptors.

use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

/// Stable key naming one grid instance.
///
/// Every persisted record and every in-flight query is scoped by this id, so
/// two grids with different ids never observe each other's state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    /// Creates a table id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TableId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TableId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Static description of one column, supplied by the caller.
///
/// Columns are reorderable, hideable and sortable unless told otherwise.
///
/// # Example
///
/// ```
/// use datagrid_lib::ColumnDescriptor;
///
/// let select = ColumnDescriptor::new("select").size(20).fixed().not_hideable().not_sortable();
/// let name = ColumnDescriptor::new("name").size(100);
///
/// assert!(!select.reorderable);
/// assert!(name.sortable);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Unique id within the table.
    pub id: String,
    /// Whether the column may be dragged to a new position.
    pub reorderable: bool,
    /// Whether the user may hide the column.
    pub hideable: bool,
    /// Whether the column may appear in the sort specification.
    pub sortable: bool,
    /// Preferred width.
    pub size: u32,
}

impl ColumnDescriptor {
    /// Default width for columns that do not set one.
    pub const DEFAULT_SIZE: u32 = 150;

    /// Creates a reorderable, hideable, sortable column.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reorderable: true,
            hideable: true,
            sortable: true,
            size: Self::DEFAULT_SIZE,
        }
    }

    /// Sets the preferred width.
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Pins the column in place: it cannot be dragged or displaced.
    pub fn fixed(mut self) -> Self {
        self.reorderable = false;
        self
    }

    /// Prevents the user from hiding the column.
    pub fn not_hideable(mut self) -> Self {
        self.hideable = false;
        self
    }

    /// Excludes the column from sorting.
    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }
}

/// The validated, immutable column set of a table.
#[derive(Debug, Clone)]
pub struct Columns {
    descriptors: Vec<ColumnDescriptor>,
}

impl Columns {
    /// Validates the descriptors: at least one column, ids unique.
    pub fn new(descriptors: Vec<ColumnDescriptor>) -> Result<Self, ConfigError> {
        if descriptors.is_empty() {
            return Err(ConfigError::EmptyColumns);
        }

        let mut seen = HashSet::with_capacity(descriptors.len());
        for column in &descriptors {
            if !seen.insert(column.id.as_str()) {
                return Err(ConfigError::DuplicateColumn(column.id.clone()));
            }
        }

        Ok(Self { descriptors })
    }

    /// Looks up a column by id.
    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.descriptors.iter().find(|c| c.id == id)
    }

    /// Returns `true` if the id names a known column.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Column ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|c| c.id.as_str())
    }

    /// Iterates over the descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.descriptors.iter()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Always `false`; construction rejects empty column sets.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Columns::new(vec![ColumnDescriptor::new("id"), ColumnDescriptor::new("id")])
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateColumn("id".to_string()));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Columns::new(Vec::new()).unwrap_err(), ConfigError::EmptyColumns);
    }

    #[test]
    fn test_builder_flags() {
        let column = ColumnDescriptor::new("actions").fixed().not_hideable();
        assert!(!column.reorderable);
        assert!(!column.hideable);
        assert!(column.sortable);
        assert_eq!(column.size, ColumnDescriptor::DEFAULT_SIZE);
    }
}
