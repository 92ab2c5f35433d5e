//! Column filters.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// A filter applied to one column.
///
/// The value is opaque to the engine; its meaning belongs to the filter widget
/// that produced it and to the remote collaborator that interprets it.
///
/// # Example
///
/// ```
/// use datagrid_lib::query::ColumnFilter;
///
/// let alive = ColumnFilter::new("status", "alive");
/// let species = ColumnFilter::new("species", serde_json::json!(["Human", "Alien"]));
/// assert_ne!(alive, species);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilter {
    /// Filtered column.
    #[serde(rename = "id")]
    pub column_id: String,
    /// Filter-specific value.
    pub value: Value,
}

impl ColumnFilter {
    /// Creates a filter on a column.
    pub fn new(column_id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column_id: column_id.into(),
            value: value.into(),
        }
    }

    /// Renders the value as a query-string fragment.
    ///
    /// Strings are passed as-is, arrays are joined with commas and anything
    /// else uses its JSON text.
    pub fn value_text(&self) -> String {
        fn scalar(value: &Value) -> String {
            match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        }

        match &self.value {
            Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(","),
            other => scalar(other),
        }
    }
}
