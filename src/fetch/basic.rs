use super::client::HttpClient;
use anyhow::{Context, Result};
use std::time::Duration;

pub struct BasicClient(reqwest::blocking::Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self(client))
    }
}

impl HttpClient for BasicClient {
    fn execute(&self, req: reqwest::blocking::Request) -> Result<Vec<u8>> {
        let url = req.url().clone();
        let resp = self
            .0
            .execute(req)
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            anyhow::bail!("API returned status {}: {}", status, body);
        }

        Ok(resp.bytes()?.to_vec())
    }
}
