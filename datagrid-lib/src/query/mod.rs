//! Query derivation and coordination.
//!
//! # Shared Types
//!
//! - [`QueryDescriptor`] - what the server is asked for
//! - [`Sort`] / [`Direction`] - sort specification entries
//! - [`ColumnFilter`] - one filter per column
//! - [`FetchResponse`] / [`FetchResult`] - a page of rows with paging info
//!
//! # Coordination
//!
//! - [`coordinator`] - issues fetches per table and discards stale completions

pub mod coordinator;
mod descriptor;
mod filter;
mod order;
mod page;

pub use coordinator::CurrentResult;
pub use coordinator::FetchStatus;
pub use coordinator::FetchTicket;
pub use coordinator::QueryCoordinator;
pub use descriptor::QueryDescriptor;
pub use filter::ColumnFilter;
pub use order::Direction;
pub use order::Sort;
pub use page::FetchResponse;
pub use page::FetchResult;
pub use page::PageInfo;
