//! JSON-over-HTTP fetcher.

use std::marker::PhantomData;
use std::sync::OnceLock;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::RowFetcher;
use crate::error::FetchError;
use crate::query::FetchResponse;
use crate::query::QueryDescriptor;

const RESERVED_PARAMS: [&str; 3] = ["page", "pageSize", "sort"];

/// Fetches pages from an HTTP endpoint answering
/// `{ "results": [...], "info": { "count": n, "pages": n } }`.
///
/// The query is sent as URL parameters: `page`, `pageSize`, one
/// `sort=<column>:<asc|desc>` per sort entry in priority order, and one
/// `<column>=<value>` per filter.
///
/// # Example
///
/// ```
/// use datagrid_lib::fetch::HttpFetcher;
/// use datagrid_lib::query::{ColumnFilter, QueryDescriptor, Sort};
///
/// let fetcher = HttpFetcher::<serde_json::Value>::new("https://example.com/api/character").unwrap();
/// let query = QueryDescriptor::new(2, 20)
///     .with_sorting(vec![Sort::desc("name")])
///     .with_filters(vec![ColumnFilter::new("status", "alive")]);
///
/// assert_eq!(
///     fetcher.request_url(&query).unwrap().as_str(),
///     "https://example.com/api/character?page=2&pageSize=20&sort=name%3Adesc&status=alive"
/// );
/// ```
pub struct HttpFetcher<R> {
    client: OnceLock<Client>,
    base_url: Url,
    _rows: PhantomData<fn() -> R>,
}

impl<R> HttpFetcher<R> {
    /// Creates a fetcher for the endpoint at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: OnceLock::new(),
            base_url: Url::parse(base_url)?,
            _rows: PhantomData,
        })
    }

    /// Builds the request URL for a query.
    ///
    /// Fails if a filter names one of the paging or sorting parameters.
    pub fn request_url(&self, query: &QueryDescriptor) -> Result<Url, FetchError> {
        if let Some(filter) = query
            .column_filters
            .iter()
            .find(|f| RESERVED_PARAMS.contains(&f.column_id.as_str()))
        {
            return Err(FetchError::InvalidQuery(format!(
                "filter on '{}' clashes with a reserved parameter",
                filter.column_id
            )));
        }

        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("pageSize", &query.page_size.to_string());
            for sort in &query.sorting {
                pairs.append_pair(
                    "sort",
                    &format!("{}:{}", sort.column_id, sort.direction.as_str()),
                );
            }
            for filter in &query.column_filters {
                pairs.append_pair(&filter.column_id, &filter.value_text());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl<R> RowFetcher<R> for HttpFetcher<R>
where
    R: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, query: &QueryDescriptor) -> Result<FetchResponse<R>, FetchError> {
        let url = self.request_url(query)?;
        debug!("GET {}", url);

        let client = self.client.get_or_init(Client::new);
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::http(status.as_u16(), body));
        }

        Ok(response.json::<FetchResponse<R>>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ColumnFilter;
    use crate::query::Sort;

    #[test]
    fn test_keeps_existing_query() {
        let fetcher = HttpFetcher::<()>::new("https://example.com/rows?tenant=a").unwrap();
        let url = fetcher.request_url(&QueryDescriptor::new(0, 10)).unwrap();
        assert_eq!(url.as_str(), "https://example.com/rows?tenant=a&page=0&pageSize=10");
    }

    #[test]
    fn test_sort_priority_and_array_filters() {
        let fetcher = HttpFetcher::<()>::new("https://example.com/rows").unwrap();
        let query = QueryDescriptor::new(1, 5)
            .with_sorting(vec![Sort::asc("species"), Sort::desc("name")])
            .with_filters(vec![ColumnFilter::new(
                "species",
                serde_json::json!(["Human", "Alien"]),
            )]);

        let pairs: Vec<(String, String)> = fetcher
            .request_url(&query)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("page".into(), "1".into()),
                ("pageSize".into(), "5".into()),
                ("sort".into(), "species:asc".into()),
                ("sort".into(), "name:desc".into()),
                ("species".into(), "Human,Alien".into()),
            ]
        );
    }

    #[test]
    fn test_filter_on_reserved_name_is_refused() {
        let fetcher = HttpFetcher::<()>::new("https://example.com/rows").unwrap();
        let query = QueryDescriptor::new(0, 10).with_filters(vec![ColumnFilter::new("page", 3)]);

        let err = fetcher.request_url(&query).unwrap_err();
        assert!(matches!(err, FetchError::InvalidQuery(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(HttpFetcher::<()>::new("not a url").is_err());
    }
}
