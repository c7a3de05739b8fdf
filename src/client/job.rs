//! Query job state machine
//!
//! Drives one [`QueryRequest`] from submission through polling to a
//! materialized [`ResultTable`]. A submission either yields the result
//! directly (cached server-side) or a job handle that is polled at a fixed
//! interval until it reaches a terminal status or the deadline elapses.
//!
//! One known upstream instability is accommodated here: a 502 response
//! while polling is treated as an empty successful result. The same status
//! on the final result fetch remains a hard failure.

use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::client::parser::ResponseParser;
use crate::client::{ClientError, ClientResult, Transport};
use crate::downloader::config::{DEFAULT_QUERY_TIMEOUT, POLL_INTERVAL};
use crate::{QueryRequest, ResultTable};

/// Status code treated as an empty result while polling.
const GATEWAY_UNAVAILABLE: u16 = 502;

/// Server-side job execution status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued, not yet picked up by a worker
    Pending,
    /// Picked up and executing
    Started,
    /// Finished with a result set
    Success,
    /// Finished with an error
    Failure,
    /// Cancelled before completion
    Cancelled,
}

impl JobStatus {
    /// Decode the wire status code (1..=5).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(JobStatus::Pending),
            2 => Some(JobStatus::Started),
            3 => Some(JobStatus::Success),
            4 => Some(JobStatus::Failure),
            5 => Some(JobStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether the job can still make progress.
    pub fn is_running(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Started)
    }
}

/// Handle for a submitted job, owned by one state machine execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    /// Server-assigned job id
    pub job_id: String,
    /// Query the job executes
    pub query_id: i64,
}

/// One parsed polling response.
#[derive(Debug, Clone)]
pub struct JobPoll {
    /// Current job status
    pub status: JobStatus,
    /// Remote-supplied error message, if any
    pub error: Option<String>,
    /// Result-set reference, present once the job succeeded
    pub query_result_id: Option<String>,
}

/// Outcome of a query submission.
///
/// The service answers with either a cached result payload or a job to
/// poll; modeling this as a tagged variant keeps the two response shapes
/// from leaking into callers.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Result was already computed server-side
    Immediate(ResultTable),
    /// A job was created and must be polled
    Pending(JobHandle),
}

/// Executes one query to completion against a [`Transport`].
pub struct QueryJob<'a> {
    transport: &'a dyn Transport,
    poll_interval: Duration,
    timeout: Duration,
}

impl<'a> QueryJob<'a> {
    /// Create a job runner with default polling cadence and deadline.
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self {
            transport,
            poll_interval: POLL_INTERVAL,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the interval between status polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Override the overall deadline, measured from submission.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the request to completion.
    pub async fn run(&self, request: &QueryRequest) -> ClientResult<ResultTable> {
        let deadline = Instant::now() + self.timeout;

        let body = json!({
            "parameters": &request.parameters,
            "max_age": request.max_age,
        });

        debug!(query_id = request.query_id, "Submitting query");
        let response = self.transport.submit_query(request.query_id, &body).await?;

        match ResponseParser::parse_submit(response, request.query_id)? {
            SubmitOutcome::Immediate(table) => {
                debug!(
                    query_id = request.query_id,
                    rows = table.row_count(),
                    "Result served from cache"
                );
                Ok(table)
            }
            SubmitOutcome::Pending(handle) => self.poll_to_completion(&handle, deadline).await,
        }
    }

    /// Poll until the job reaches a terminal status or the deadline passes.
    async fn poll_to_completion(
        &self,
        handle: &JobHandle,
        deadline: Instant,
    ) -> ClientResult<ResultTable> {
        debug!(job_id = %handle.job_id, query_id = handle.query_id, "Polling job");

        loop {
            if Instant::now() >= deadline {
                return Err(ClientError::Timeout(format!(
                    "Query {} exceeded {}s waiting for job {}",
                    handle.query_id,
                    self.timeout.as_secs(),
                    handle.job_id
                )));
            }

            tokio::time::sleep(self.poll_interval).await;

            let response = self.transport.poll_job(&handle.job_id).await?;
            if response.status == GATEWAY_UNAVAILABLE {
                warn!(
                    job_id = %handle.job_id,
                    "Gateway unavailable while polling, treating as empty result"
                );
                return Ok(ResultTable::default());
            }

            let poll = ResponseParser::parse_job(response)?;
            match poll.status {
                JobStatus::Pending | JobStatus::Started => {
                    debug!(job_id = %handle.job_id, status = ?poll.status, "Job still running");
                }
                JobStatus::Success => {
                    let result_id = poll.query_result_id.ok_or_else(|| {
                        ClientError::InvalidResponse(
                            "Successful job without a query_result_id".to_string(),
                        )
                    })?;
                    return self.fetch_result(handle, &result_id).await;
                }
                JobStatus::Failure => {
                    return Err(ClientError::JobFailed(
                        poll.error.unwrap_or_else(|| "Query failed".to_string()),
                    ));
                }
                JobStatus::Cancelled => {
                    return Err(ClientError::JobFailed(
                        poll.error.unwrap_or_else(|| "Query cancelled".to_string()),
                    ));
                }
            }
        }
    }

    /// Fetch and parse the result set referenced by a completed job.
    async fn fetch_result(&self, handle: &JobHandle, result_id: &str) -> ClientResult<ResultTable> {
        debug!(job_id = %handle.job_id, result_id = %result_id, "Fetching result set");

        let response = self.transport.fetch_result(result_id).await?;
        if response.status >= 400 {
            // 502 here is a hard failure, unlike during polling.
            return Err(ClientError::HttpError {
                status: response.status,
                body: response.body_text(),
            });
        }

        let table = ResponseParser::parse_result(response)?;
        debug!(
            result_id = %result_id,
            rows = table.row_count(),
            "Result set fetched"
        );
        Ok(table)
    }
}
