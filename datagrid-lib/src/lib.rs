//! Remote data-grid engine
//!
//! Stateful core of a paginated, filterable, sortable table view backed by a
//! remote collection: view-state persistence per table, query coordination with
//! stale-result suppression, column reordering and load-state derivation.
//! Rendering is left to the embedder, which reads [`grid::RenderSnapshot`]s and
//! feeds intents back through [`grid::DataGrid`].

pub mod column;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod load_state;
pub mod query;
pub mod reorder;
pub mod state;
pub mod store;

pub use column::ColumnDescriptor;
pub use column::Columns;
pub use column::TableId;
pub use config::GridConfig;
pub use grid::DataGrid;
pub use grid::RenderSnapshot;
