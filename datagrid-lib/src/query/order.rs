//! Sort specification.

use serde::Deserialize;
use serde::Serialize;

/// Sort direction for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Returns the lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One entry of the sort specification.
///
/// A table's sorting is a `Vec<Sort>`; position in the vector is priority.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::Sort;
///
/// let sorting = vec![Sort::desc("created"), Sort::asc("name")];
/// assert_eq!(sorting[0].column_id, "created");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    /// Column being sorted.
    #[serde(rename = "id")]
    pub column_id: String,
    /// Direction.
    pub direction: Direction,
}

impl Sort {
    /// Ascending sort on a column.
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending sort on a column.
    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: Direction::Desc,
        }
    }
}
