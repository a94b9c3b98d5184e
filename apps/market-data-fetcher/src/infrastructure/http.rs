//! JSON HTTP client shared by the upstream adapters.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::application::ports::FetchError;

const USER_AGENT: &str = concat!("market-data-fetcher/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over [`reqwest::Client`] that maps every failure onto
/// [`FetchError`].
#[derive(Debug, Clone)]
pub struct JsonHttpClient {
    client: Client,
}

impl JsonHttpClient {
    /// Create a client. Without a timeout, requests wait as long as the
    /// transport allows.
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header("accept", "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%url, status = status.as_u16(), body = %body, "Upstream error response");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}
