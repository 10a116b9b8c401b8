use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API key as an HTTP header.
///
/// data.gov.sg accepts anonymous requests but grants higher rate limits to
/// requests carrying `x-api-key`.
pub struct ApiKey<C> {
    pub inner: C,
    pub header_name: String,
    pub key: String,
}

impl<C> ApiKey<C> {
    /// Uses the `x-api-key` header expected by data.gov.sg.
    pub fn data_gov_sg(inner: C, key: String) -> Self {
        Self {
            inner,
            header_name: "x-api-key".to_string(),
            key,
        }
    }
}

impl<C: HttpClient> HttpClient for ApiKey<C> {
    fn execute(&self, mut req: reqwest::blocking::Request) -> Result<Vec<u8>> {
        let header_name = HeaderName::from_bytes(self.header_name.as_bytes())
            .with_context(|| format!("Invalid API key header name '{}'", self.header_name))?;
        let mut value = HeaderValue::from_str(&self.key).context("Invalid API key value")?;
        value.set_sensitive(true);
        req.headers_mut().insert(header_name, value);
        self.inner.execute(req)
    }
}
