//! View-state controller
//!
//! Every mutation of a table's [`ViewState`] goes through here. Each setter
//! resolves its [`Updater`] against the previous value, normalizes the result,
//! writes it to the [`ViewStateStore`] and only then adopts it as the local
//! state. The value handed back to the caller is the one that was written.
//!
//! A failing store never fails a mutation: the controller logs the error,
//! marks itself degraded and keeps the state in memory for the session.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use log::info;
use log::trace;
use log::warn;
use tokio::sync::broadcast;

use crate::column::Columns;
use crate::column::TableId;
use crate::config::GridConfig;
use crate::config::PersistMode;
use crate::error::ConfigError;
use crate::query::ColumnFilter;
use crate::query::Sort;
use crate::state::Pagination;
use crate::state::Updater;
use crate::state::ViewState;
use crate::state::normalize_column_order;
use crate::state::normalize_filters;
use crate::state::normalize_sorting;
use crate::state::normalize_visibility;
use crate::state::validate_pagination;
use crate::store::PersistedViewState;
use crate::store::TableState;
use crate::store::ViewStateStore;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A mutable field of [`ViewState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewField {
    ColumnOrder,
    ColumnVisibility,
    Pagination,
    Sorting,
    ColumnFilters,
    RowSelection,
}

/// Notification sent after a committed mutation, one per touched field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Table whose state changed.
    pub table_id: TableId,
    /// Field that was written.
    pub field: ViewField,
}

/// Single funnel for the view-state mutations of one table.
pub struct ViewStateController {
    table_id: TableId,
    columns: Columns,
    config: GridConfig,
    store: ViewStateStore,
    state: ViewState,
    persistence_degraded: bool,
    changes: broadcast::Sender<StateChange>,
}

impl ViewStateController {
    /// Loads the table's state from the store, or defaults if nothing usable
    /// is stored.
    ///
    /// Fails only on invalid configuration; an unreadable store starts the
    /// controller in degraded, session-only mode.
    pub async fn load(
        table_id: TableId,
        columns: Columns,
        config: GridConfig,
        store: ViewStateStore,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (persisted, persistence_degraded) = match store.get(&table_id).await {
            Ok(persisted) => (persisted, false),
            Err(err) => {
                warn!(
                    "loading view state for table '{}' failed, continuing session-only: {}",
                    table_id, err
                );
                (None, true)
            }
        };

        let state = ViewState::hydrate(&columns, &config, persisted.as_ref());
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            table_id,
            columns,
            config,
            store,
            state,
            persistence_degraded,
            changes,
        })
    }

    /// Table this controller owns.
    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    /// Column descriptors of the table.
    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Grid configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Current local state.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Returns `true` while the store is failing and state is session-only.
    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    /// Subscribes to committed mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Sets the column order. The result is always a full permutation with
    /// the pinned trailing column last.
    pub async fn set_column_order(&mut self, updater: impl Into<Updater<Vec<String>>>) -> Vec<String> {
        let previous = &self.state.column_order;
        if let Some(order) = resolve(&self.table_id, ViewField::ColumnOrder, updater.into(), previous) {
            let mut next = self.state.clone();
            next.column_order = normalize_column_order(
                order,
                &self.columns,
                self.config.pinned_trailing_column.as_deref(),
            );
            self.commit(next, &[ViewField::ColumnOrder]).await;
        }
        self.state.column_order.clone()
    }

    /// Sets the visibility overrides.
    pub async fn set_column_visibility(
        &mut self,
        updater: impl Into<Updater<BTreeMap<String, bool>>>,
    ) -> BTreeMap<String, bool> {
        let previous = &self.state.column_visibility;
        if let Some(visibility) =
            resolve(&self.table_id, ViewField::ColumnVisibility, updater.into(), previous)
        {
            let mut next = self.state.clone();
            next.column_visibility = normalize_visibility(visibility, &self.columns);
            self.commit(next, &[ViewField::ColumnVisibility]).await;
        }
        self.state.column_visibility.clone()
    }

    /// Sets the pagination. A zero page size is refused.
    pub async fn set_pagination(&mut self, updater: impl Into<Updater<Pagination>>) -> Pagination {
        let previous = &self.state.pagination;
        let resolved = resolve(&self.table_id, ViewField::Pagination, updater.into(), previous)
            .and_then(|pagination| match validate_pagination(pagination) {
                Ok(pagination) => Some(pagination),
                Err(err) => {
                    trace!("ignoring pagination update for table '{}': {}", self.table_id, err);
                    None
                }
            });

        if let Some(pagination) = resolved {
            let mut next = self.state.clone();
            next.pagination = pagination;
            self.commit(next, &[ViewField::Pagination]).await;
        }
        self.state.pagination
    }

    /// Sets the sort specification. A change moves the table back to its
    /// first page in the same commit.
    pub async fn set_sorting(&mut self, updater: impl Into<Updater<Vec<Sort>>>) -> Vec<Sort> {
        let previous = &self.state.sorting;
        if let Some(sorting) = resolve(&self.table_id, ViewField::Sorting, updater.into(), previous) {
            let mut next = self.state.clone();
            next.sorting = normalize_sorting(sorting, &self.columns);
            let fields = self.reset_page_on_change(&mut next, ViewField::Sorting);
            self.commit(next, &fields).await;
        }
        self.state.sorting.clone()
    }

    /// Sets the column filters. A change moves the table back to its first
    /// page in the same commit.
    pub async fn set_column_filters(
        &mut self,
        updater: impl Into<Updater<Vec<ColumnFilter>>>,
    ) -> Vec<ColumnFilter> {
        let previous = &self.state.column_filters;
        if let Some(filters) = resolve(&self.table_id, ViewField::ColumnFilters, updater.into(), previous)
        {
            let mut next = self.state.clone();
            next.column_filters = normalize_filters(filters);
            let fields = self.reset_page_on_change(&mut next, ViewField::ColumnFilters);
            self.commit(next, &fields).await;
        }
        self.state.column_filters.clone()
    }

    /// Sets the selected row ids.
    pub async fn set_row_selection(
        &mut self,
        updater: impl Into<Updater<BTreeSet<String>>>,
    ) -> BTreeSet<String> {
        let previous = &self.state.row_selection;
        if let Some(selection) = resolve(&self.table_id, ViewField::RowSelection, updater.into(), previous)
        {
            let mut next = self.state.clone();
            next.row_selection = selection;
            self.commit(next, &[ViewField::RowSelection]).await;
        }
        self.state.row_selection.clone()
    }

    fn reset_page_on_change(&self, next: &mut ViewState, field: ViewField) -> Vec<ViewField> {
        let changed = match field {
            ViewField::Sorting => next.sorting != self.state.sorting,
            ViewField::ColumnFilters => next.column_filters != self.state.column_filters,
            _ => false,
        };
        if !changed {
            return vec![field];
        }

        next.pagination.page_index = 0;
        vec![field, ViewField::Pagination]
    }

    /// Writes the touched fields of `next` to the store, then adopts `next`.
    async fn commit(&mut self, next: ViewState, fields: &[ViewField]) {
        let patch = self.patch_for(&next, fields);
        if !patch.is_empty() {
            match self.store.set(&self.table_id, patch).await {
                Ok(_) if self.persistence_degraded => {
                    info!("view state for table '{}' is persisted again", self.table_id);
                    self.persistence_degraded = false;
                }
                Ok(_) => {}
                Err(err) => {
                    if !self.persistence_degraded {
                        warn!(
                            "persisting view state for table '{}' failed, continuing session-only: {}",
                            self.table_id, err
                        );
                    }
                    self.persistence_degraded = true;
                }
            }
        }

        self.state = next;
        for &field in fields {
            trace!("table '{}': committed {:?}", self.table_id, field);
            // No receivers is fine.
            let _ = self.changes.send(StateChange {
                table_id: self.table_id.clone(),
                field,
            });
        }
    }

    fn persists(&self, field: ViewField) -> bool {
        match self.config.persist {
            PersistMode::Extended => true,
            PersistMode::Basic => {
                matches!(field, ViewField::ColumnOrder | ViewField::ColumnVisibility)
            }
        }
    }

    fn patch_for(&self, state: &ViewState, fields: &[ViewField]) -> PersistedViewState {
        let mut patch = PersistedViewState::default();
        for &field in fields.iter().filter(|&&f| self.persists(f)) {
            match field {
                ViewField::ColumnOrder => patch.column_order = Some(state.column_order.clone()),
                ViewField::ColumnVisibility => {
                    patch.column_visibility = Some(state.column_visibility.clone())
                }
                ViewField::Pagination => patch.pagination = Some(state.pagination),
                ViewField::RowSelection => patch.row_selection = Some(state.row_selection.clone()),
                ViewField::Sorting => {
                    patch.table_state.get_or_insert_with(TableState::default).sorting =
                        Some(state.sorting.clone())
                }
                ViewField::ColumnFilters => {
                    patch
                        .table_state
                        .get_or_insert_with(TableState::default)
                        .column_filters = Some(state.column_filters.clone())
                }
            }
        }
        patch
    }
}

fn resolve<T>(table_id: &TableId, field: ViewField, updater: Updater<T>, previous: &T) -> Option<T> {
    match updater.resolve(previous) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("update of {:?} on table '{}' rejected: {}", field, table_id, err);
            None
        }
    }
}
