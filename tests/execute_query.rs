//! Job state machine scenarios against a scripted transport.

mod common;

use common::{
    job_payload, job_status_payload, ok, result_payload, with_status, Call, MockTransport,
};
use query_data_downloader::client::{ClientError, QueryJob};
use query_data_downloader::QueryRequest;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const FAST_POLL: Duration = Duration::from_millis(1);

fn request() -> QueryRequest {
    QueryRequest::new(42)
}

#[tokio::test]
async fn immediate_result_skips_polling() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(result_payload(
            &["id", "name"],
            &[vec!["1", "alpha"], vec!["2", "beta"]],
        )),
        other => panic!("Unexpected call: {other:?}"),
    });

    let table = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap();

    assert_eq!(table.headers, vec!["id", "name"]);
    assert_eq!(table.rows, vec![vec!["1", "alpha"], vec!["2", "beta"]]);
    assert_eq!(transport.poll_count(), 0);
    assert_eq!(transport.fetch_count(), 0);
}

#[tokio::test]
async fn pending_job_is_polled_to_completion() {
    let polls = AtomicUsize::new(0);
    let transport = MockTransport::new(move |call| match call {
        Call::Submit { query_id, .. } => {
            assert_eq!(*query_id, 42);
            ok(job_payload("job-1"))
        }
        Call::Poll { job_id } => {
            assert_eq!(job_id, "job-1");
            match polls.fetch_add(1, Ordering::SeqCst) {
                0 => ok(job_status_payload(1, None, None)),
                1 => ok(job_status_payload(2, None, None)),
                _ => ok(job_status_payload(3, Some(77), None)),
            }
        }
        Call::Fetch { result_id } => {
            assert_eq!(result_id, "77");
            ok(result_payload(&["n"], &[vec!["10"]]))
        }
    });

    let table = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap();

    assert_eq!(table.rows, vec![vec!["10"]]);
    assert_eq!(transport.poll_count(), 3);
    assert_eq!(transport.fetch_count(), 1);
}

#[tokio::test]
async fn gateway_unavailable_while_polling_is_empty_success() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(job_payload("job-1")),
        Call::Poll { .. } => with_status(502, json!({})),
        other => panic!("Unexpected call: {other:?}"),
    });

    let table = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap();

    assert!(table.headers.is_empty());
    assert!(table.rows.is_empty());
    assert_eq!(transport.fetch_count(), 0);
}

#[tokio::test]
async fn gateway_unavailable_on_result_fetch_is_hard_failure() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(job_payload("job-1")),
        Call::Poll { .. } => ok(job_status_payload(3, Some(77), None)),
        Call::Fetch { .. } => with_status(502, json!({})),
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap_err();

    match err {
        ClientError::HttpError { status, .. } => assert_eq!(status, 502),
        other => panic!("Expected HttpError, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_job_without_message_uses_generic_default() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(job_payload("job-1")),
        Call::Poll { .. } => ok(job_status_payload(4, None, None)),
        other => panic!("Unexpected call: {other:?}"),
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap_err();

    match err {
        ClientError::JobFailed(message) => assert_eq!(message, "Query failed"),
        other => panic!("Expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_job_without_message_uses_generic_default() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(job_payload("job-1")),
        Call::Poll { .. } => ok(job_status_payload(5, None, None)),
        other => panic!("Unexpected call: {other:?}"),
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap_err();

    match err {
        ClientError::JobFailed(message) => assert_eq!(message, "Query cancelled"),
        other => panic!("Expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_job_surfaces_remote_message() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(job_payload("job-1")),
        Call::Poll { .. } => ok(job_status_payload(4, None, Some("division by zero"))),
        other => panic!("Unexpected call: {other:?}"),
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap_err();

    match err {
        ClientError::JobFailed(message) => assert_eq!(message, "division by zero"),
        other => panic!("Expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn top_level_message_is_api_error() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => with_status(403, json!({"message": "Couldn't execute query"})),
        other => panic!("Unexpected call: {other:?}"),
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap_err();

    match err {
        ClientError::ApiMessage(message) => assert_eq!(message, "Couldn't execute query"),
        other => panic!("Expected ApiMessage, got {other:?}"),
    }
}

#[tokio::test]
async fn polling_deadline_yields_timeout() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(job_payload("job-1")),
        Call::Poll { .. } => ok(job_status_payload(1, None, None)),
        other => panic!("Unexpected call: {other:?}"),
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .with_timeout(Duration::from_millis(20))
        .run(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Timeout(_)));
    // Polling kept going until the deadline, never fetching anything.
    assert!(transport.poll_count() > 0);
    assert_eq!(transport.fetch_count(), 0);
}

#[tokio::test]
async fn transport_failure_propagates() {
    let transport = MockTransport::new(|_| {
        Err(ClientError::TransportError("connection refused".to_string()))
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TransportError(_)));
}

#[tokio::test]
async fn malformed_submit_payload_is_invalid_response() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { .. } => ok(json!({"neither": "shape"})),
        other => panic!("Unexpected call: {other:?}"),
    });

    let err = QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn submit_body_carries_parameters_and_max_age() {
    let transport = MockTransport::new(|call| match call {
        Call::Submit { body, .. } => {
            assert_eq!(body["max_age"], 60);
            assert_eq!(body["parameters"]["region"], "emea");
            ok(result_payload(&[], &[]))
        }
        other => panic!("Unexpected call: {other:?}"),
    });

    let mut request = QueryRequest::new(42).with_max_age(60);
    request
        .parameters
        .insert("region".to_string(), "emea".to_string());

    QueryJob::new(&transport)
        .with_poll_interval(FAST_POLL)
        .run(&request)
        .await
        .unwrap();
}
