//! Remote collaborator seam.
//!
//! The engine never talks to the network itself. A [`RowFetcher`] receives
//! the table's [`QueryDescriptor`] and answers with one page of rows;
//! [`HttpFetcher`] is a ready-made implementation for JSON endpoints.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::query::FetchResponse;
use crate::query::QueryDescriptor;

/// Performs the remote query for a grid.
///
/// Retries, timeouts and authentication are the implementation's business;
/// the engine only sees the final outcome.
///
/// # Example
///
/// ```ignore
/// struct Characters;
///
/// #[async_trait]
/// impl RowFetcher<Character> for Characters {
///     async fn fetch(&self, query: &QueryDescriptor) -> Result<FetchResponse<Character>, FetchError> {
///         api::characters(query.page, query.page_size).await
///     }
/// }
/// ```
#[async_trait]
pub trait RowFetcher<R>: Send + Sync {
    /// Fetches the page described by `query`.
    async fn fetch(&self, query: &QueryDescriptor) -> Result<FetchResponse<R>, FetchError>;
}
