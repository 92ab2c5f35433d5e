//! Query descriptor: the part of the view state the server cares about.

use serde::Deserialize;
use serde::Serialize;

use super::ColumnFilter;
use super::Sort;

/// The minimal projection of a view state that affects server-side results.
///
/// Two view states with equal descriptors request identical remote data, so
/// equality here is what de-duplicates fetches. `page` is already expressed in
/// the remote collaborator's numbering (see [`crate::config::PageBase`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    /// Requested page number.
    pub page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Sort specification, highest priority first.
    pub sorting: Vec<Sort>,
    /// One filter per filtered column.
    pub column_filters: Vec<ColumnFilter>,
}

impl QueryDescriptor {
    /// Creates an unsorted, unfiltered descriptor.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            sorting: Vec::new(),
            column_filters: Vec::new(),
        }
    }

    /// Sets the sort specification.
    pub fn with_sorting(mut self, sorting: Vec<Sort>) -> Self {
        self.sorting = sorting;
        self
    }

    /// Sets the column filters.
    pub fn with_filters(mut self, column_filters: Vec<ColumnFilter>) -> Self {
        self.column_filters = column_filters;
        self
    }
}
