//! HTTP transport over reqwest
//!
//! One shared [`reqwest::Client`] serves all concurrent segments; the
//! connection pool is the only state shared between in-flight jobs. No retry
//! logic lives here: polling is the protocol's waiting mechanism, and every
//! other failure is surfaced immediately to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::client::{ApiResponse, ClientError, ClientResult, Transport};

/// Connect timeout for individual HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport for the query-execution service.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    /// Create a new transport.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the service API, without trailing slash
    /// * `api_key` - Credential sent as `Authorization: Key <api_key>`
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ClientError::TransportError(format!("Failed to build client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Convert a reqwest response into an [`ApiResponse`].
    ///
    /// Non-JSON bodies are preserved as strings so error paths can report
    /// them verbatim.
    async fn into_api_response(response: reqwest::Response) -> ClientResult<ApiResponse> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::TransportError(format!("Failed to read body: {e}")))?;

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(value) => value,
            Err(_) => Value::String(text),
        };

        Ok(ApiResponse { status, body })
    }

    async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .send()
            .await
            .map_err(|e| ClientError::TransportError(e.to_string()))?;

        Self::into_api_response(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> ClientResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::TransportError(e.to_string()))?;

        Self::into_api_response(response).await
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit_query(&self, query_id: i64, body: &Value) -> ClientResult<ApiResponse> {
        self.post(&format!("/queries/{query_id}/results"), body).await
    }

    async fn poll_job(&self, job_id: &str) -> ClientResult<ApiResponse> {
        self.get(&format!("/jobs/{job_id}")).await
    }

    async fn fetch_result(&self, result_id: &str) -> ClientResult<ApiResponse> {
        self.get(&format!("/query_results/{result_id}")).await
    }
}
