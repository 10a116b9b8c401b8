//! JSON decoding of datastore search responses.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// One record as returned by the API: field name to raw JSON value.
pub type RawRecord = Map<String, Value>;

#[derive(Deserialize)]
struct SearchResponse {
    result: SearchResult,
}

#[derive(Deserialize)]
struct SearchResult {
    records: Vec<RawRecord>,
}

/// Decodes the records of one `datastore_search` response page.
///
/// # Errors
///
/// Returns an error if the body is not JSON, or lacks `result.records`.
pub fn parse_page(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let response: SearchResponse =
        serde_json::from_slice(bytes).context("Response is missing result.records")?;
    Ok(response.result.records)
}
