//! Paginated retrieval of datastore records.
//!
//! The data.gov.sg `datastore_search` action serves a resource in pages
//! selected by `limit` and `offset`. [`fetch_all`] walks the pages until the
//! API returns an empty one.

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::parser::{RawRecord, parse_page};
use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_BASE_URL: &str = "https://data.gov.sg/api/action/datastore_search";
pub const DEFAULT_RESOURCE_ID: &str = "83b2fc37-ce8c-4df4-968b-370fd818138b";
pub const DEFAULT_PAGE_SIZE: usize = 10_000;

/// Where and how to page through a datastore resource.
#[derive(Debug, Clone)]
pub struct DatastoreQuery {
    pub base_url: String,
    pub resource_id: String,
    pub page_size: usize,
    /// Pause between consecutive page requests. Zero disables it.
    pub page_delay: Duration,
}

impl Default for DatastoreQuery {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            resource_id: DEFAULT_RESOURCE_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::ZERO,
        }
    }
}

impl DatastoreQuery {
    /// Builds the URL for the page starting at `offset`.
    pub fn page_url(&self, offset: usize) -> Result<Url> {
        let limit = self.page_size.to_string();
        let offset = offset.to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("resource_id", self.resource_id.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ],
        )
        .with_context(|| format!("Invalid base URL '{}'", self.base_url))
    }
}

/// Requests a single page and decodes its records.
pub fn fetch_page<C: HttpClient>(
    client: &C,
    query: &DatastoreQuery,
    offset: usize,
) -> Result<Vec<RawRecord>> {
    let url = query.page_url(offset)?;
    let req = reqwest::blocking::Request::new(reqwest::Method::GET, url);

    let bytes = client
        .execute(req)
        .with_context(|| format!("Failed to fetch page at offset {offset}"))?;
    debug!(offset, bytes = bytes.len(), "Page received");

    parse_page(&bytes).with_context(|| format!("Malformed page at offset {offset}"))
}

/// Fetches every record of the resource, one page at a time.
///
/// Stops at the first empty page, so a resource of `N` records served in
/// pages of `P` takes `ceil(N / P) + 1` requests. Any failed request aborts
/// the whole fetch.
#[tracing::instrument(
    skip(client, query),
    fields(resource_id = %query.resource_id, page_size = query.page_size)
)]
pub fn fetch_all<C: HttpClient>(client: &C, query: &DatastoreQuery) -> Result<Vec<RawRecord>> {
    if query.page_size == 0 {
        anyhow::bail!("page size must be greater than zero");
    }

    info!("Fetching records from datastore");

    let mut all_records = Vec::new();
    let mut offset = 0;

    loop {
        if offset > 0 && !query.page_delay.is_zero() {
            std::thread::sleep(query.page_delay);
        }

        let records = fetch_page(client, query, offset)?;
        if records.is_empty() {
            break;
        }

        info!(count = records.len(), offset, "Retrieved records");
        all_records.extend(records);
        offset += query.page_size;
    }

    info!(total = all_records.len(), "Fetch complete");
    Ok(all_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::time::Instant;

    /// Serves `records` in pages according to the request's limit/offset.
    struct PagedApi {
        records: Vec<serde_json::Value>,
        requests: RefCell<Vec<Url>>,
        fail_at_offset: Option<usize>,
    }

    impl PagedApi {
        fn new(n: usize) -> Self {
            let records = (0..n)
                .map(|i| json!({"_id": i + 1, "town": "ANG MO KIO", "resale_price": "300000"}))
                .collect();
            Self {
                records,
                requests: RefCell::new(Vec::new()),
                fail_at_offset: None,
            }
        }
    }

    fn query_param(url: &Url, name: &str) -> usize {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .and_then(|(_, v)| v.parse().ok())
            .unwrap()
    }

    impl HttpClient for PagedApi {
        fn execute(&self, req: reqwest::blocking::Request) -> Result<Vec<u8>> {
            let url = req.url().clone();
            self.requests.borrow_mut().push(url.clone());

            let limit = query_param(&url, "limit");
            let offset = query_param(&url, "offset");
            if self.fail_at_offset == Some(offset) {
                anyhow::bail!("API returned status 500 Internal Server Error");
            }

            let page: Vec<_> = self
                .records
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();
            Ok(serde_json::to_vec(&json!({"result": {"records": page}}))?)
        }
    }

    fn query(page_size: usize) -> DatastoreQuery {
        DatastoreQuery {
            base_url: "https://api.test/datastore_search".to_string(),
            resource_id: "res-1".to_string(),
            page_size,
            page_delay: Duration::ZERO,
        }
    }

    fn delayed_query(page_size: usize, page_delay: Duration) -> DatastoreQuery {
        DatastoreQuery {
            page_delay,
            ..query(page_size)
        }
    }

    #[test]
    fn test_page_url_has_query_params() {
        let url = query(50).page_url(100).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.test/datastore_search?resource_id=res-1&limit=50&offset=100"
        );
    }

    #[test]
    fn test_fetch_all_request_count() {
        for (n, p) in [(0, 3), (1, 3), (3, 3), (7, 3), (10, 10), (25, 10)] {
            let api = PagedApi::new(n);
            let records = fetch_all(&api, &query(p)).unwrap();

            assert_eq!(records.len(), n);
            assert_eq!(api.requests.borrow().len(), n.div_ceil(p) + 1, "n={n} p={p}");
        }
    }

    #[test]
    fn test_fetch_all_advances_offset_by_page_size() {
        let api = PagedApi::new(5);
        fetch_all(&api, &query(2)).unwrap();

        let offsets: Vec<_> = api
            .requests
            .borrow()
            .iter()
            .map(|u| query_param(u, "offset"))
            .collect();
        assert_eq!(offsets, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_fetch_all_preserves_record_order() {
        let api = PagedApi::new(4);
        let records = fetch_all(&api, &query(3)).unwrap();
        let ids: Vec<_> = records
            .iter()
            .map(|r| r["_id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_fetch_all_aborts_on_http_error() {
        let mut api = PagedApi::new(10);
        api.fail_at_offset = Some(3);

        let err = fetch_all(&api, &query(3)).unwrap_err();
        assert!(format!("{err:#}").contains("offset 3"));
        assert_eq!(api.requests.borrow().len(), 2);
    }

    #[test]
    fn test_fetch_all_rejects_zero_page_size() {
        let api = PagedApi::new(1);
        assert!(fetch_all(&api, &query(0)).is_err());
        assert!(api.requests.borrow().is_empty());
    }

    #[test]
    fn test_page_delay_between_requests() {
        let delay = Duration::from_millis(20);
        let api = PagedApi::new(5);

        let start = Instant::now();
        fetch_all(&api, &delayed_query(2, delay)).unwrap();
        let elapsed = start.elapsed();

        let requests = api.requests.borrow().len();
        assert_eq!(requests, 4);
        assert!(elapsed >= delay * (requests as u32 - 1), "elapsed={elapsed:?}");
    }

    #[test]
    fn test_page_delay_not_applied_before_first_request() {
        let delay = Duration::from_secs(2);
        let api = PagedApi::new(0);

        let start = Instant::now();
        fetch_all(&api, &delayed_query(10, delay)).unwrap();

        assert_eq!(api.requests.borrow().len(), 1);
        assert!(start.elapsed() < delay, "elapsed={:?}", start.elapsed());
    }

    #[test]
    fn test_zero_page_delay_does_not_sleep() {
        let api = PagedApi::new(50);

        let start = Instant::now();
        fetch_all(&api, &query(1)).unwrap();

        assert_eq!(api.requests.borrow().len(), 51);
        assert!(start.elapsed() < Duration::from_secs(1), "elapsed={:?}", start.elapsed());
    }
}
