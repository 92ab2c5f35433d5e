//! Fetch results.

use serde::Deserialize;
use serde::Serialize;

/// Paging information reported by the remote collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Total number of rows matching the query.
    pub count: usize,
    /// Number of pages at the requested page size.
    pub pages: usize,
}

/// The remote collaborator's answer, in its wire shape.
///
/// ```json
/// { "info": { "count": 826, "pages": 83 }, "results": [ ... ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse<R> {
    /// Rows of the requested page.
    pub results: Vec<R>,
    /// Paging information.
    pub info: PageInfo,
}

impl<R> FetchResponse<R> {
    /// Creates a response.
    pub fn new(results: Vec<R>, count: usize, pages: usize) -> Self {
        Self {
            results,
            info: PageInfo { count, pages },
        }
    }
}

/// One page of rows as committed by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<R> {
    rows: Vec<R>,
    total_count: usize,
    page_count: usize,
}

impl<R> FetchResult<R> {
    /// Creates a result.
    pub fn new(rows: Vec<R>, total_count: usize, page_count: usize) -> Self {
        Self {
            rows,
            total_count,
            page_count,
        }
    }

    /// Rows of the page, in server order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Total number of rows matching the query.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Number of pages at the requested page size.
    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

impl<R> From<FetchResponse<R>> for FetchResult<R> {
    fn from(response: FetchResponse<R>) -> Self {
        Self::new(response.results, response.info.count, response.info.pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_wire_shape() {
        let body = json!({
            "info": { "count": 826, "pages": 83, "next": "ignored" },
            "results": [{ "id": 1 }, { "id": 2 }]
        });
        let response: FetchResponse<serde_json::Value> = serde_json::from_value(body).unwrap();
        let result = FetchResult::from(response);

        assert_eq!(result.rows().len(), 2);
        assert_eq!(result.total_count(), 826);
        assert_eq!(result.page_count(), 83);
    }
}
