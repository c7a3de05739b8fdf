//! Shared test support: a scripted transport and payload builders.
#![allow(dead_code)]

use async_trait::async_trait;
use query_data_downloader::client::{ApiResponse, ClientResult, Transport};
use serde_json::{json, Map, Value};
use std::sync::Mutex;

/// One observed transport call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `POST /queries/{id}/results`
    Submit { query_id: i64, body: Value },
    /// `GET /jobs/{job_id}`
    Poll { job_id: String },
    /// `GET /query_results/{result_id}`
    Fetch { result_id: String },
}

/// What a scripted handler produces for one call.
pub type HandlerResult = ClientResult<ApiResponse>;

type Handler = Box<dyn Fn(&Call) -> HandlerResult + Send + Sync>;

/// Deterministic transport driven by a scripted handler.
///
/// Every call is recorded before the handler runs, so tests can assert on
/// exactly which requests were issued and with which parameters.
pub struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&Call) -> ClientResult<ApiResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submit_bodies(&self) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Submit { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn submit_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Submit { .. }))
    }

    pub fn poll_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Poll { .. }))
    }

    pub fn fetch_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Fetch { .. }))
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(c)).count()
    }

    fn dispatch(&self, call: Call) -> ClientResult<ApiResponse> {
        self.calls.lock().unwrap().push(call.clone());
        (self.handler)(&call)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn submit_query(&self, query_id: i64, body: &Value) -> ClientResult<ApiResponse> {
        self.dispatch(Call::Submit {
            query_id,
            body: body.clone(),
        })
    }

    async fn poll_job(&self, job_id: &str) -> ClientResult<ApiResponse> {
        self.dispatch(Call::Poll {
            job_id: job_id.to_string(),
        })
    }

    async fn fetch_result(&self, result_id: &str) -> ClientResult<ApiResponse> {
        self.dispatch(Call::Fetch {
            result_id: result_id.to_string(),
        })
    }
}

/// 200 response.
pub fn ok(body: Value) -> ClientResult<ApiResponse> {
    Ok(ApiResponse { status: 200, body })
}

/// Response with an explicit status code.
pub fn with_status(status: u16, body: Value) -> ClientResult<ApiResponse> {
    Ok(ApiResponse { status, body })
}

/// `{"job": {"id": ...}}` submission envelope.
pub fn job_payload(job_id: &str) -> Value {
    json!({"job": {"id": job_id}})
}

/// Polling envelope with status code and optional result id / error.
pub fn job_status_payload(status: i64, result_id: Option<i64>, error: Option<&str>) -> Value {
    let mut job = Map::new();
    job.insert("status".to_string(), json!(status));
    if let Some(id) = result_id {
        job.insert("query_result_id".to_string(), json!(id));
    }
    if let Some(message) = error {
        job.insert("error".to_string(), json!(message));
    }
    json!({ "job": job })
}

/// `{"query_result": {"data": {...}}}` result payload.
pub fn result_payload(headers: &[&str], rows: &[Vec<&str>]) -> Value {
    let columns: Vec<Value> = headers.iter().map(|name| json!({"name": name})).collect();
    let rows: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for (header, cell) in headers.iter().zip(row.iter()) {
                object.insert(header.to_string(), json!(cell));
            }
            Value::Object(object)
        })
        .collect();

    json!({"query_result": {"data": {"columns": columns, "rows": rows}}})
}

/// Pull a submitted request parameter out of a recorded submit body.
pub fn body_param<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get("parameters")?.get(key)?.as_str()
}
