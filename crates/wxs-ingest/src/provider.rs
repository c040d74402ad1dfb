//! HTTP client for the realtime weather provider

use reqwest::{header::ACCEPT, Client};
use tracing::{debug, instrument};
use url::Url;
use wxs_core::{PipelineError, PipelineResult, TelemetrySource};

use crate::IngestResult;

/// Fetches the realtime conditions for one fixed location.
///
/// One GET per call: no retry, no caching.
pub struct ProviderClient {
    client: Client,
    url: Url,
}

impl ProviderClient {
    pub fn new(endpoint: &str, latitude: f64, longitude: f64, api_key: &str) -> IngestResult<Self> {
        let location = format!("{},{}", latitude, longitude);
        let url = Url::parse_with_params(
            endpoint,
            &[("location", location.as_str()), ("apikey", api_key)],
        )?;
        let client = Client::builder().build()?;
        Ok(Self { client, url })
    }

    /// Endpoint without the query string, safe to log
    pub fn endpoint(&self) -> String {
        let mut url = self.url.clone();
        url.set_query(None);
        url.to_string()
    }
}

#[async_trait::async_trait]
impl TelemetrySource for ProviderClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint()))]
    async fn fetch_snapshot(&self) -> PipelineResult<String> {
        let response = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| PipelineError::ProviderUnavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::ProviderUnavailable(format!(
                "provider returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::ProviderUnavailable(e.without_url().to_string()))?;
        debug!(bytes = body.len(), "Fetched weather snapshot");
        Ok(body)
    }
}
