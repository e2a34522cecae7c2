use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

/// Source of raw station snapshots for a municipality.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch one page of snapshots. Each element is one station, unvalidated.
    async fn fetch_snapshots(&self, municipality_id: i32, page: u32)
        -> Result<Vec<Value>, FetchError>;
}

/// HTTP client for the upstream price-data API.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn snapshot_url(&self, municipality_id: i32, page: u32) -> String {
        format!(
            "{}/gasStationBusinessUnits/city/{}/{}",
            self.base_url, municipality_id, page
        )
    }
}

/// Split a response body into per-station snapshots. The API answers with
/// either one station object or an array of them.
pub fn split_snapshots(status: u16, body: &str) -> Result<Vec<Value>, FetchError> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|_| FetchError::invalid_body(status, body))?;

    match parsed {
        Value::Object(_) => Ok(vec![parsed]),
        Value::Array(items) if items.iter().all(Value::is_object) => Ok(items),
        _ => Err(FetchError::invalid_body(status, body)),
    }
}

#[async_trait]
impl PriceSource for UpstreamClient {
    async fn fetch_snapshots(
        &self,
        municipality_id: i32,
        page: u32,
    ) -> Result<Vec<Value>, FetchError> {
        let url = self.snapshot_url(municipality_id, page);
        log::debug!("Fetching station snapshots from {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), &body));
        }

        split_snapshots(status.as_u16(), &body)
    }
}

/// Canned source for tests; answers every request with the same result.
#[cfg(test)]
pub(crate) struct StaticSource {
    pub response: Result<Vec<Value>, FetchError>,
}

#[cfg(test)]
#[async_trait]
impl PriceSource for StaticSource {
    async fn fetch_snapshots(
        &self,
        _municipality_id: i32,
        _page: u32,
    ) -> Result<Vec<Value>, FetchError> {
        self.response.clone()
    }
}
