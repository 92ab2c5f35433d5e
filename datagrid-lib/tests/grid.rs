use std::collections::BTreeMap;
use std::collections::BTreeSet;

use async_trait::async_trait;
use datagrid_lib::ColumnDescriptor;
use datagrid_lib::Columns;
use datagrid_lib::DataGrid;
use datagrid_lib::GridConfig;
use datagrid_lib::TableId;
use datagrid_lib::error::FetchError;
use datagrid_lib::fetch::RowFetcher;
use datagrid_lib::load_state::Presentation;
use datagrid_lib::query::ColumnFilter;
use datagrid_lib::query::FetchResponse;
use datagrid_lib::query::QueryDescriptor;
use datagrid_lib::query::Sort;
use datagrid_lib::reorder::ReorderIntent;
use datagrid_lib::state::Pagination;
use datagrid_lib::state::Updater;
use datagrid_lib::store::ViewStateStore;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
struct Character {
    id: u32,
    name: String,
}

type Reply = oneshot::Sender<Result<FetchResponse<Character>, FetchError>>;

/// Fetcher whose calls stay pending until the test answers them.
struct GatedFetcher {
    calls: mpsc::UnboundedSender<(QueryDescriptor, Reply)>,
}

#[async_trait]
impl RowFetcher<Character> for GatedFetcher {
    async fn fetch(&self, query: &QueryDescriptor) -> Result<FetchResponse<Character>, FetchError> {
        let (reply, answer) = oneshot::channel();
        self.calls
            .send((query.clone(), reply))
            .map_err(|_| FetchError::Transport("harness gone".into()))?;
        answer
            .await
            .map_err(|_| FetchError::Transport("call dropped".into()))?
    }
}

fn columns() -> Columns {
    Columns::new(vec![
        ColumnDescriptor::new("select").fixed().not_hideable().not_sortable(),
        ColumnDescriptor::new("id"),
        ColumnDescriptor::new("name"),
        ColumnDescriptor::new("species"),
        ColumnDescriptor::new("actions").fixed().not_hideable().not_sortable(),
    ])
    .unwrap()
}

fn ids(order: &[&str]) -> Vec<String> {
    order.iter().map(|s| s.to_string()).collect()
}

fn page(len: u32, count: usize, pages: usize) -> FetchResponse<Character> {
    let rows = (1..=len)
        .map(|id| Character {
            id,
            name: format!("character {id}"),
        })
        .collect();
    FetchResponse::new(rows, count, pages)
}

type Pending = mpsc::UnboundedReceiver<(QueryDescriptor, Reply)>;

async fn mount_with(
    store: &ViewStateStore,
    columns: Columns,
    config: GridConfig,
) -> (DataGrid<Character>, Pending) {
    let (calls, pending) = mpsc::unbounded_channel();
    let grid = DataGrid::mount("characters", columns, config, store.clone(), GatedFetcher { calls })
        .await
        .unwrap();
    (grid, pending)
}

async fn mount(store: &ViewStateStore) -> (DataGrid<Character>, Pending) {
    mount_with(store, columns(), GridConfig::default()).await
}

/// Lets spawned fetch tasks deliver their completions.
async fn let_fetches_finish() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_first_page_populates() {
    let store = ViewStateStore::in_memory();
    let (mut grid, mut pending) = mount(&store).await;
    assert_eq!(grid.snapshot().load_state.presentation, Presentation::Loading);

    let (query, reply) = pending.recv().await.unwrap();
    assert_eq!(query, QueryDescriptor::new(0, 10));
    reply.send(Ok(page(10, 826, 83))).unwrap();
    grid.settle().await;

    let snapshot = grid.snapshot();
    assert_eq!(snapshot.load_state.presentation, Presentation::Populated);
    assert!(!snapshot.load_state.revalidating);
    assert_eq!(snapshot.rows.len(), 10);
    assert_eq!(snapshot.rows[0].id, 1);
    assert_eq!(snapshot.rows[0].name, "character 1");
    assert_eq!(snapshot.total_count, 826);
    assert_eq!(snapshot.page_count, 83);
}

#[tokio::test]
async fn test_stale_page_is_discarded() {
    let store = ViewStateStore::in_memory();
    let (mut grid, mut pending) = mount(&store).await;
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(page(10, 826, 83))).unwrap();
    grid.settle().await;

    grid.set_pagination(Pagination::new(1, 10)).await;
    let (second_page, second_reply) = pending.recv().await.unwrap();
    assert_eq!(second_page.page, 1);

    grid.set_column_filters(vec![ColumnFilter::new("status", "alive")])
        .await;
    assert_eq!(grid.state().pagination.page_index, 0);
    let (filtered, filtered_reply) = pending.recv().await.unwrap();
    assert_eq!(filtered.page, 0);
    assert_eq!(filtered.column_filters, vec![ColumnFilter::new("status", "alive")]);

    second_reply.send(Ok(page(10, 826, 83))).unwrap();
    assert!(!grid.next_completion().await);
    assert_eq!(grid.snapshot().load_state.presentation, Presentation::Loading);
    assert!(grid.snapshot().rows.is_empty());

    filtered_reply.send(Ok(page(4, 4, 1))).unwrap();
    assert!(grid.next_completion().await);
    let snapshot = grid.snapshot();
    assert_eq!(snapshot.load_state.presentation, Presentation::Populated);
    assert_eq!(snapshot.total_count, 4);
}

#[tokio::test]
async fn test_equal_query_is_not_refetched() {
    let store = ViewStateStore::in_memory();
    let (mut grid, mut pending) = mount(&store).await;
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(page(10, 826, 83))).unwrap();
    grid.settle().await;

    grid.set_pagination(Pagination::new(0, 10)).await;
    grid.set_sorting(Vec::new()).await;
    tokio::task::yield_now().await;

    assert!(!grid.is_fetching());
    assert!(pending.try_recv().is_err());
}

#[tokio::test]
async fn test_refetch_keeps_rows_visible() {
    let store = ViewStateStore::in_memory();
    let (mut grid, mut pending) = mount(&store).await;
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(page(10, 826, 83))).unwrap();
    grid.settle().await;

    assert!(grid.refetch());
    assert!(!grid.refetch());
    let snapshot = grid.snapshot();
    assert_eq!(snapshot.load_state.presentation, Presentation::Populated);
    assert!(snapshot.load_state.revalidating);

    let (_, reply) = pending.recv().await.unwrap();
    reply
        .send(Err(FetchError::http(503, "maintenance")))
        .unwrap();
    grid.settle().await;

    let snapshot = grid.snapshot();
    assert_eq!(snapshot.load_state.presentation, Presentation::Populated);
    assert_eq!(snapshot.error.and_then(FetchError::status_code), Some(503));
}

#[tokio::test]
async fn test_failed_first_fetch_is_errored() {
    let store = ViewStateStore::in_memory();
    let (mut grid, mut pending) = mount(&store).await;
    let (_, reply) = pending.recv().await.unwrap();
    reply
        .send(Err(FetchError::Transport("connection refused".into())))
        .unwrap();
    grid.settle().await;

    assert_eq!(grid.snapshot().load_state.presentation, Presentation::Errored);
}

#[tokio::test]
async fn test_empty_result() {
    let store = ViewStateStore::in_memory();
    let (mut grid, mut pending) = mount(&store).await;
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(page(0, 0, 0))).unwrap();
    grid.settle().await;

    assert_eq!(grid.snapshot().load_state.presentation, Presentation::Empty);
}

#[tokio::test]
async fn test_reorder_keeps_pinned_column_last() {
    let store = ViewStateStore::in_memory();
    let (mut grid, _pending) = mount(&store).await;

    let order = grid.reorder(&ReorderIntent::new("name", "id")).await;
    assert_eq!(order, ids(&["select", "name", "id", "species", "actions"]));

    let unchanged = grid.reorder(&ReorderIntent::new("name", "actions")).await;
    assert_eq!(unchanged, order);

    let stored = store.get(&TableId::new("characters")).await.unwrap().unwrap();
    assert_eq!(stored.column_order, Some(order));
}

#[tokio::test]
async fn test_state_survives_remount() {
    let store = ViewStateStore::in_memory();
    {
        let (mut grid, _pending) = mount(&store).await;
        grid.set_sorting(vec![Sort::desc("name")]).await;
        grid.set_pagination(Pagination::new(3, 25)).await;
        grid.set_column_visibility(BTreeMap::from([("species".to_string(), false)]))
            .await;
    }

    let (grid, mut pending) = mount(&store).await;
    let (query, _reply) = pending.recv().await.unwrap();
    assert_eq!(
        query,
        QueryDescriptor::new(3, 25).with_sorting(vec![Sort::desc("name")])
    );
    assert_eq!(
        grid.snapshot().visible_columns(),
        vec!["select", "id", "name", "actions"]
    );
}

#[tokio::test]
async fn test_store_matches_returned_values() {
    let store = ViewStateStore::in_memory();
    let (mut grid, _pending) = mount(&store).await;
    let table = TableId::new("characters");

    let mut changes = grid.subscribe();

    let order = grid.set_column_order(ids(&["species", "name"])).await;
    let visibility = grid
        .set_column_visibility(BTreeMap::from([
            ("id".to_string(), false),
            ("select".to_string(), false),
        ]))
        .await;
    let sorting = grid
        .set_sorting(Updater::apply(|_: &Vec<Sort>| vec![Sort::asc("name"), Sort::asc("select")]))
        .await;
    let selection = grid
        .set_row_selection(BTreeSet::from(["3".to_string()]))
        .await;
    let pagination = grid.set_pagination(Pagination::new(2, 10)).await;

    assert_eq!(order, ids(&["species", "name", "select", "id", "actions"]));
    assert_eq!(visibility, BTreeMap::from([("id".to_string(), false)]));
    assert_eq!(sorting, vec![Sort::asc("name")]);
    assert!(!grid.is_persistence_degraded());
    assert!(changes.try_recv().is_ok());

    let stored = store.get(&table).await.unwrap().unwrap();
    assert_eq!(stored.column_order, Some(order));
    assert_eq!(stored.column_visibility, Some(visibility));
    assert_eq!(stored.table_state.unwrap().sorting, Some(sorting));
    assert_eq!(stored.row_selection, Some(selection));
    assert_eq!(stored.pagination, Some(pagination));
}

#[tokio::test]
async fn test_pinned_column_stays_last_after_raw_move() {
    let store = ViewStateStore::in_memory();
    let columns = Columns::new(vec![
        ColumnDescriptor::new("a"),
        ColumnDescriptor::new("b"),
        ColumnDescriptor::new("actions"),
    ])
    .unwrap();
    let config = GridConfig::default().with_pinned_trailing_column("actions");
    let (mut grid, _pending) = mount_with(&store, columns, config).await;

    let order = grid.reorder(&ReorderIntent::new("a", "actions")).await;

    assert_eq!(order, ids(&["b", "a", "actions"]));
    assert_eq!(grid.snapshot().column_order, order.as_slice());
    let stored = store.get(&TableId::new("characters")).await.unwrap().unwrap();
    assert_eq!(stored.column_order, Some(order));
}

#[tokio::test]
async fn test_drain_commits_only_current_completion() {
    let store = ViewStateStore::in_memory();
    let (mut grid, mut pending) = mount(&store).await;
    let (_, reply) = pending.recv().await.unwrap();
    reply.send(Ok(page(10, 826, 83))).unwrap();
    grid.settle().await;

    grid.set_pagination(Pagination::new(1, 10)).await;
    let (_, stale_reply) = pending.recv().await.unwrap();
    grid.set_pagination(Pagination::new(2, 10)).await;
    let (current, current_reply) = pending.recv().await.unwrap();
    assert_eq!(current.page, 2);

    stale_reply.send(Ok(page(10, 826, 83))).unwrap();
    current_reply.send(Ok(page(3, 826, 83))).unwrap();
    let_fetches_finish().await;

    assert_eq!(grid.drain_completions(), 1);
    assert!(!grid.is_fetching());
    assert_eq!(grid.snapshot().rows.len(), 3);
    assert_eq!(grid.drain_completions(), 0);
}
