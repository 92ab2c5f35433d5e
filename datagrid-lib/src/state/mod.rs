//! Per-table view state and its field normalization.
//!
//! [`ViewState`] holds everything the user can change about one grid. The
//! free functions in this module enforce the field invariants; the controller
//! runs every mutation through them before committing.

mod updater;

pub use updater::Updater;

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::column::Columns;
use crate::config::GridConfig;
use crate::config::PageBase;
use crate::config::PersistMode;
use crate::error::ValidationError;
use crate::query::ColumnFilter;
use crate::query::QueryDescriptor;
use crate::query::Sort;
use crate::store::PersistedViewState;

/// Position within the remote result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Zero-based page index.
    pub page_index: usize,
    /// Rows per page, always positive once committed.
    pub page_size: usize,
}

impl Pagination {
    /// Creates a pagination state.
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// First page at the given size.
    pub fn first(page_size: usize) -> Self {
        Self::new(0, page_size)
    }
}

/// The full mutable state of one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Display order; always a permutation of every known column id.
    pub column_order: Vec<String>,
    /// Visibility overrides; an absent id is visible.
    pub column_visibility: BTreeMap<String, bool>,
    /// Current page.
    pub pagination: Pagination,
    /// Sort specification, highest priority first.
    pub sorting: Vec<Sort>,
    /// One filter per filtered column.
    pub column_filters: Vec<ColumnFilter>,
    /// Ids of selected rows.
    pub row_selection: BTreeSet<String>,
}

impl ViewState {
    /// Initial state derived from the column descriptors alone.
    pub fn defaults(columns: &Columns, config: &GridConfig) -> Self {
        Self {
            column_order: normalize_column_order(
                columns.ids().map(str::to_string).collect(),
                columns,
                config.pinned_trailing_column.as_deref(),
            ),
            column_visibility: BTreeMap::new(),
            pagination: Pagination::first(config.page_size),
            sorting: Vec::new(),
            column_filters: Vec::new(),
            row_selection: BTreeSet::new(),
        }
    }

    /// Initial state from a persisted record, falling back to defaults for
    /// every field the record lacks or the persist mode does not cover.
    ///
    /// Persisted values are normalized against the current columns, so a
    /// record written for an older column set still yields a valid state.
    pub fn hydrate(
        columns: &Columns,
        config: &GridConfig,
        persisted: Option<&PersistedViewState>,
    ) -> Self {
        let mut state = Self::defaults(columns, config);
        let Some(persisted) = persisted else {
            return state;
        };

        if let Some(order) = &persisted.column_order {
            state.column_order = normalize_column_order(
                order.clone(),
                columns,
                config.pinned_trailing_column.as_deref(),
            );
        }
        if let Some(visibility) = &persisted.column_visibility {
            state.column_visibility = normalize_visibility(visibility.clone(), columns);
        }

        if config.persist == PersistMode::Basic {
            return state;
        }

        if let Some(pagination) = persisted.pagination.filter(|p| p.page_size > 0) {
            state.pagination = pagination;
        }
        if let Some(selection) = &persisted.row_selection {
            state.row_selection = selection.clone();
        }
        if let Some(table_state) = &persisted.table_state {
            if let Some(sorting) = &table_state.sorting {
                state.sorting = normalize_sorting(sorting.clone(), columns);
            }
            if let Some(filters) = &table_state.column_filters {
                state.column_filters = normalize_filters(filters.clone());
            }
        }

        state
    }

    /// Projects the fields that determine the remote result.
    pub fn query_descriptor(&self, page_base: PageBase) -> QueryDescriptor {
        QueryDescriptor {
            page: page_base.page_number(self.pagination.page_index),
            page_size: self.pagination.page_size,
            sorting: self.sorting.clone(),
            column_filters: self.column_filters.clone(),
        }
    }

    /// Returns `true` unless the column is explicitly hidden.
    pub fn is_column_visible(&self, id: &str) -> bool {
        self.column_visibility.get(id).copied().unwrap_or(true)
    }

    /// Visible column ids in display order.
    pub fn visible_columns(&self) -> Vec<&str> {
        self.column_order
            .iter()
            .map(String::as_str)
            .filter(|id| self.is_column_visible(id))
            .collect()
    }
}

/// Turns any id sequence into a permutation of the known columns.
///
/// Unknown ids and repeats are dropped, known ids that are missing are
/// appended in declaration order, and the pinned trailing column (when it is
/// a known column) is moved to the end.
pub fn normalize_column_order(
    order: Vec<String>,
    columns: &Columns,
    pinned_trailing: Option<&str>,
) -> Vec<String> {
    let mut seen = HashSet::with_capacity(columns.len());
    let mut normalized: Vec<String> = order
        .into_iter()
        .filter(|id| columns.contains(id) && seen.insert(id.clone()))
        .collect();

    for id in columns.ids() {
        if !seen.contains(id) {
            normalized.push(id.to_string());
        }
    }

    if let Some(pinned) = pinned_trailing.filter(|id| columns.contains(id)) {
        normalized.retain(|id| id != pinned);
        normalized.push(pinned.to_string());
    }

    normalized
}

/// Refuses to hide columns declared unhideable. Overrides for ids without a
/// descriptor are kept as given.
pub fn normalize_visibility(
    visibility: BTreeMap<String, bool>,
    columns: &Columns,
) -> BTreeMap<String, bool> {
    visibility
        .into_iter()
        .filter(|(id, visible)| *visible || columns.get(id).is_none_or(|c| c.hideable))
        .collect()
}

/// Drops entries for columns declared unsortable and keeps the first entry
/// per column. Ids without a descriptor are kept as given.
pub fn normalize_sorting(sorting: Vec<Sort>, columns: &Columns) -> Vec<Sort> {
    let mut seen = HashSet::new();
    sorting
        .into_iter()
        .filter(|sort| {
            columns.get(&sort.column_id).is_none_or(|c| c.sortable)
                && seen.insert(sort.column_id.clone())
        })
        .collect()
}

/// Keeps one filter per column id; a repeated id takes the later value at
/// the earlier position. Filters may name fields that are not displayed
/// columns, so ids are not checked against the descriptors.
pub fn normalize_filters(filters: Vec<ColumnFilter>) -> Vec<ColumnFilter> {
    let mut normalized: Vec<ColumnFilter> = Vec::with_capacity(filters.len());
    for filter in filters {
        match normalized.iter_mut().find(|f| f.column_id == filter.column_id) {
            Some(existing) => existing.value = filter.value,
            None => normalized.push(filter),
        }
    }
    normalized
}

/// Rejects zero-sized pages.
pub fn validate_pagination(pagination: Pagination) -> Result<Pagination, ValidationError> {
    if pagination.page_size == 0 {
        return Err(ValidationError::InvalidPageSize);
    }
    Ok(pagination)
}
