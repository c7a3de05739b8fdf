//! Response payload parsing
//!
//! Stateless parsing functions for converting service JSON responses into
//! typed structures. Centralizing the shape handling here keeps the job
//! state machine free of `serde_json::Value` plumbing.

use serde_json::Value;

use crate::client::job::{JobHandle, JobPoll, JobStatus, SubmitOutcome};
use crate::client::{ApiResponse, ClientError, ClientResult};
use crate::ResultTable;

/// Stateless parser for query-service responses
pub struct ResponseParser;

impl ResponseParser {
    /// Reject error responses, preferring the service's own message.
    ///
    /// The service wraps logical errors in `{"message": ...}` regardless of
    /// status code; those become [`ClientError::ApiMessage`]. Any other
    /// non-2xx response becomes [`ClientError::HttpError`].
    fn check_error(response: ApiResponse) -> ClientResult<Value> {
        if let Some(message) = response.body.get("message").and_then(Value::as_str) {
            return Err(ClientError::ApiMessage(message.to_string()));
        }

        if response.status >= 400 {
            return Err(ClientError::HttpError {
                status: response.status,
                body: response.body_text(),
            });
        }

        Ok(response.body)
    }

    /// Parse a submission response into its tagged outcome.
    ///
    /// A submission either returns the result payload directly (already
    /// cached server-side) or a job envelope to poll.
    pub fn parse_submit(response: ApiResponse, query_id: i64) -> ClientResult<SubmitOutcome> {
        let body = Self::check_error(response)?;

        if let Some(job) = body.get("job") {
            let job_id = Self::parse_id(job.get("id"))
                .ok_or_else(|| ClientError::InvalidResponse("Missing job id".to_string()))?;
            return Ok(SubmitOutcome::Pending(JobHandle { job_id, query_id }));
        }

        if body.get("query_result").is_some() {
            return Ok(SubmitOutcome::Immediate(Self::parse_table(&body)?));
        }

        Err(ClientError::InvalidResponse(
            "Expected job or query_result in submission response".to_string(),
        ))
    }

    /// Parse a job polling response.
    pub fn parse_job(response: ApiResponse) -> ClientResult<JobPoll> {
        let body = Self::check_error(response)?;

        let job = body
            .get("job")
            .ok_or_else(|| ClientError::InvalidResponse("Missing job envelope".to_string()))?;

        let code = job
            .get("status")
            .and_then(Value::as_i64)
            .ok_or_else(|| ClientError::InvalidResponse("Missing job status".to_string()))?;

        let status = JobStatus::from_code(code).ok_or_else(|| {
            ClientError::InvalidResponse(format!("Unknown job status code: {code}"))
        })?;

        let error = job
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let query_result_id = Self::parse_id(job.get("query_result_id"));

        Ok(JobPoll {
            status,
            error,
            query_result_id,
        })
    }

    /// Parse a result-set response into a [`ResultTable`].
    pub fn parse_result(response: ApiResponse) -> ClientResult<ResultTable> {
        let body = Self::check_error(response)?;
        Self::parse_table(&body)
    }

    /// Parse a `{"query_result": {"data": {...}}}` payload.
    fn parse_table(body: &Value) -> ClientResult<ResultTable> {
        let data = body
            .get("query_result")
            .and_then(|qr| qr.get("data"))
            .ok_or_else(|| {
                ClientError::InvalidResponse("Missing query_result data".to_string())
            })?;

        let columns = data
            .get("columns")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::InvalidResponse("Missing result columns".to_string()))?;

        let mut headers = Vec::with_capacity(columns.len());
        for column in columns {
            let name = column
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ClientError::InvalidResponse("Column without a name".to_string())
                })?;
            headers.push(name.to_string());
        }

        let raw_rows = data
            .get("rows")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::InvalidResponse("Missing result rows".to_string()))?;

        let mut rows = Vec::with_capacity(raw_rows.len());
        for raw in raw_rows {
            let object = raw.as_object().ok_or_else(|| {
                ClientError::InvalidResponse("Result row is not an object".to_string())
            })?;

            // Cells are ordered by the columns declaration, not by the row
            // object's own key order; absent keys render as empty strings.
            let row = headers
                .iter()
                .map(|header| object.get(header).map(Self::render_value).unwrap_or_default())
                .collect();
            rows.push(row);
        }

        Ok(ResultTable { headers, rows })
    }

    /// Render one cell value as a string.
    fn render_value(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            other => other.to_string(),
        }
    }

    /// Normalize an id that may arrive as an integer or a string.
    fn parse_id(value: Option<&Value>) -> Option<String> {
        match value? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
