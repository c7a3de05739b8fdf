//! Remote service client: transport seam, job state machine, response parsing
//!
//! The remote service executes saved queries asynchronously. A submission
//! either returns a cached result directly or hands back a job that must be
//! polled to completion before its result set can be fetched. This module
//! exposes that protocol behind the [`Transport`] trait so the orchestration
//! layer can run against HTTP in production and scripted transports in tests.

use async_trait::async_trait;
use serde_json::Value;

pub mod http;
pub mod job;
pub mod parser;

pub use http::HttpTransport;
pub use job::{JobHandle, JobStatus, QueryJob, SubmitOutcome};

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network or connection failure below the HTTP layer
    #[error("transport error: {0}")]
    TransportError(String),

    /// Non-2xx response outside the special-cased codes
    #[error("HTTP error {status}: {body}")]
    HttpError {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Logical error reported by the remote service
    #[error("API error: {0}")]
    ApiMessage(String),

    /// Job reached a terminal Failure or Cancelled status
    #[error("job failed: {0}")]
    JobFailed(String),

    /// Polling deadline elapsed before the job completed
    #[error("query timed out: {0}")]
    Timeout(String),

    /// Payload shape violates the expected schema
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Structured response from the remote service: status code plus parsed body.
///
/// Bodies that are not valid JSON are carried as a JSON string so error
/// reporting can still surface them.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Value,
}

impl ApiResponse {
    /// Render the body as plain text for error messages.
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Transport capable of issuing the three protocol calls.
///
/// Implementations return a structured response for any HTTP status; only
/// failures below the HTTP layer surface as [`ClientError::TransportError`].
/// Shared read-only across concurrent segments.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit a query execution: `POST /queries/{id}/results`.
    async fn submit_query(&self, query_id: i64, body: &Value) -> ClientResult<ApiResponse>;

    /// Poll job status: `GET /jobs/{job_id}`.
    async fn poll_job(&self, job_id: &str) -> ClientResult<ApiResponse>;

    /// Fetch a completed result set: `GET /query_results/{result_id}`.
    async fn fetch_result(&self, result_id: &str) -> ClientResult<ApiResponse>;
}
