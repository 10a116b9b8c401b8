use anyhow::Result;
use reqwest::blocking::Request;

/// Blocking HTTP transport used by the datastore fetcher.
///
/// Implementations return the body of a successful response and treat any
/// non-success status as an error.
pub trait HttpClient {
    fn execute(&self, req: Request) -> Result<Vec<u8>>;
}
