//! Grid runtime: the engine as seen by presentation code.
//!
//! A [`DataGrid`] owns one table's controller, its query coordinator, the
//! reorder engine and the remote fetcher. Mutators go through the controller;
//! whenever the query-relevant part of the state changes a fetch is spawned on
//! the tokio runtime. Completions come back over a channel and are applied by
//! [`DataGrid::next_completion`], [`DataGrid::settle`] or
//! [`DataGrid::drain_completions`], at which point stale ones are dropped.
//!
//! # Example
//!
//! ```ignore
//! let mut grid = DataGrid::mount("characters", columns, GridConfig::default(), store, fetcher).await?;
//! grid.settle().await;
//!
//! let snapshot = grid.snapshot();
//! render(snapshot.visible_columns(), snapshot.rows);
//!
//! grid.set_column_filters(vec![ColumnFilter::new("status", "alive")]).await;
//! grid.settle().await;
//! ```

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;
use tokio::sync::broadcast;
use tokio::sync::mpsc;

use crate::column::Columns;
use crate::column::TableId;
use crate::config::GridConfig;
use crate::controller::StateChange;
use crate::controller::ViewStateController;
use crate::error::ConfigError;
use crate::error::FetchError;
use crate::fetch::RowFetcher;
use crate::load_state::LoadState;
use crate::query::ColumnFilter;
use crate::query::FetchResult;
use crate::query::FetchStatus;
use crate::query::FetchTicket;
use crate::query::QueryCoordinator;
use crate::query::Sort;
use crate::reorder::ReorderEngine;
use crate::reorder::ReorderIntent;
use crate::state::Pagination;
use crate::state::Updater;
use crate::state::ViewState;
use crate::store::ViewStateStore;

struct Completion<R> {
    ticket: FetchTicket,
    outcome: Result<FetchResult<R>, FetchError>,
}

/// Read-only render state of a grid.
#[derive(Debug)]
pub struct RenderSnapshot<'a, R> {
    /// Rows of the current page (empty while loading).
    pub rows: &'a [R],
    /// Number of pages reported for the current query.
    pub page_count: usize,
    /// Number of rows matching the current query.
    pub total_count: usize,
    /// What the body should show.
    pub load_state: LoadState,
    /// Failure of the last attempt for the current query.
    pub error: Option<&'a FetchError>,
    /// Display order of all columns.
    pub column_order: &'a [String],
    /// Visibility overrides.
    pub column_visibility: &'a BTreeMap<String, bool>,
    /// Current page.
    pub pagination: Pagination,
    /// Sort specification.
    pub sorting: &'a [Sort],
    /// Column filters.
    pub column_filters: &'a [ColumnFilter],
    /// Selected row ids.
    pub row_selection: &'a BTreeSet<String>,
}

impl<R> RenderSnapshot<'_, R> {
    /// Visible column ids in display order.
    pub fn visible_columns(&self) -> Vec<&str> {
        self.column_order
            .iter()
            .map(String::as_str)
            .filter(|id| self.column_visibility.get(*id).copied().unwrap_or(true))
            .collect()
    }
}

/// One mounted table: view state, remote data and the glue between them.
pub struct DataGrid<R> {
    controller: ViewStateController,
    coordinator: QueryCoordinator<R>,
    reorder: ReorderEngine,
    fetcher: Arc<dyn RowFetcher<R>>,
    completions_tx: mpsc::UnboundedSender<Completion<R>>,
    completions_rx: mpsc::UnboundedReceiver<Completion<R>>,
}

impl<R: Send + 'static> DataGrid<R> {
    /// Mounts a table: hydrates its view state from `store` and issues the
    /// first fetch.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn mount(
        table_id: impl Into<TableId>,
        columns: Columns,
        config: GridConfig,
        store: ViewStateStore,
        fetcher: impl RowFetcher<R> + 'static,
    ) -> Result<Self, ConfigError> {
        let controller = ViewStateController::load(table_id.into(), columns, config, store).await?;
        let reorder = ReorderEngine::new(controller.columns());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let mut grid = Self {
            controller,
            coordinator: QueryCoordinator::new(),
            reorder,
            fetcher: Arc::new(fetcher),
            completions_tx,
            completions_rx,
        };
        grid.sync_query();
        Ok(grid)
    }

    /// Table this grid shows.
    pub fn table_id(&self) -> &TableId {
        self.controller.table_id()
    }

    /// Current view state.
    pub fn state(&self) -> &ViewState {
        self.controller.state()
    }

    /// Returns `true` while view state is not being persisted.
    pub fn is_persistence_degraded(&self) -> bool {
        self.controller.is_persistence_degraded()
    }

    /// Subscribes to committed view-state mutations.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.controller.subscribe()
    }

    /// Builds the render state.
    pub fn snapshot(&self) -> RenderSnapshot<'_, R> {
        let state = self.controller.state();
        let current = self.coordinator.current(self.controller.table_id());

        let (data, status, error) = match current {
            Some(current) => (current.data, current.status, current.error),
            None => (None, FetchStatus::Pending, None),
        };
        let rows = data.map(FetchResult::rows).unwrap_or(&[]);

        RenderSnapshot {
            rows,
            // Paging controls read "page 1 of 1" until a page arrives.
            page_count: data.map_or(1, FetchResult::page_count),
            total_count: data.map_or(0, FetchResult::total_count),
            load_state: LoadState::derive(status, rows.len()),
            error,
            column_order: &state.column_order,
            column_visibility: &state.column_visibility,
            pagination: state.pagination,
            sorting: &state.sorting,
            column_filters: &state.column_filters,
            row_selection: &state.row_selection,
        }
    }

    /// Sets the column order.
    pub async fn set_column_order(&mut self, updater: impl Into<Updater<Vec<String>>>) -> Vec<String> {
        self.controller.set_column_order(updater).await
    }

    /// Sets the visibility overrides.
    pub async fn set_column_visibility(
        &mut self,
        updater: impl Into<Updater<BTreeMap<String, bool>>>,
    ) -> BTreeMap<String, bool> {
        self.controller.set_column_visibility(updater).await
    }

    /// Sets the pagination and fetches the page if it is new.
    pub async fn set_pagination(&mut self, updater: impl Into<Updater<Pagination>>) -> Pagination {
        let pagination = self.controller.set_pagination(updater).await;
        self.sync_query();
        pagination
    }

    /// Sets the sort specification and fetches if the query changed.
    pub async fn set_sorting(&mut self, updater: impl Into<Updater<Vec<Sort>>>) -> Vec<Sort> {
        let sorting = self.controller.set_sorting(updater).await;
        self.sync_query();
        sorting
    }

    /// Sets the column filters and fetches if the query changed.
    pub async fn set_column_filters(
        &mut self,
        updater: impl Into<Updater<Vec<ColumnFilter>>>,
    ) -> Vec<ColumnFilter> {
        let filters = self.controller.set_column_filters(updater).await;
        self.sync_query();
        filters
    }

    /// Sets the selected row ids.
    pub async fn set_row_selection(
        &mut self,
        updater: impl Into<Updater<BTreeSet<String>>>,
    ) -> BTreeSet<String> {
        self.controller.set_row_selection(updater).await
    }

    /// Applies a completed drag gesture. Invalid gestures leave the order
    /// untouched.
    pub async fn reorder(&mut self, intent: &ReorderIntent) -> Vec<String> {
        match self.reorder.reorder(intent, &self.controller.state().column_order) {
            Ok(order) => self.controller.set_column_order(order).await,
            Err(err) => {
                debug!("ignoring reorder on table '{}': {}", self.table_id(), err);
                self.controller.state().column_order.clone()
            }
        }
    }

    /// Refetches the current query in the background, keeping the rows on
    /// screen. Returns `false` if a fetch is already outstanding.
    pub fn refetch(&mut self) -> bool {
        match self.coordinator.revalidate(self.controller.table_id()) {
            Some(ticket) => {
                self.spawn_fetch(ticket);
                true
            }
            None => false,
        }
    }

    /// Returns `true` while the current query has an outstanding fetch.
    pub fn is_fetching(&self) -> bool {
        self.coordinator.is_in_flight(self.controller.table_id())
    }

    /// Waits for the next fetch to finish and applies it.
    ///
    /// Returns whether the result was committed (`false` for stale results).
    /// Waits indefinitely if no fetch is outstanding.
    pub async fn next_completion(&mut self) -> bool {
        match self.completions_rx.recv().await {
            Some(completion) => self.apply(completion),
            // Unreachable while the grid holds a sender.
            None => false,
        }
    }

    /// Applies completions until the current query has settled.
    pub async fn settle(&mut self) {
        while self.is_fetching() {
            self.next_completion().await;
        }
    }

    /// Applies every completion that has already arrived without waiting.
    /// Returns how many were committed.
    pub fn drain_completions(&mut self) -> usize {
        let mut committed = 0;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if self.apply(completion) {
                committed += 1;
            }
        }
        committed
    }

    fn apply(&mut self, completion: Completion<R>) -> bool {
        self.coordinator.complete(completion.ticket, completion.outcome)
    }

    fn sync_query(&mut self) {
        let state = self.controller.state();
        let descriptor = state.query_descriptor(self.controller.config().page_base);
        if let Some(ticket) = self.coordinator.request(self.controller.table_id(), descriptor) {
            self.spawn_fetch(ticket);
        }
    }

    fn spawn_fetch(&self, ticket: FetchTicket) {
        let fetcher = Arc::clone(&self.fetcher);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = fetcher.fetch(ticket.descriptor()).await.map(FetchResult::from);
            // The grid may have been dropped.
            let _ = completions.send(Completion { ticket, outcome });
        });
    }
}
