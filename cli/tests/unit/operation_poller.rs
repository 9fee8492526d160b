//! Poller state machine: terminal results, timeouts, query faults.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use vmlc::application::services::operation::{PollEvent, Poller};
use vmlc::domain::{OperationHandle, PollError, PollSettings};

use crate::helpers::{ScriptedTracker, ZONE, failed_op, fast_settings, op};

fn handle() -> OperationHandle {
    OperationHandle::zonal("op-1", ZONE)
}

#[tokio::test]
async fn test_running_then_done_succeeds_with_terminal_payload() {
    let tracker = ScriptedTracker::new(vec![
        op("op-1", "RUNNING"),
        op("op-1", "RUNNING"),
        op("op-1", "DONE"),
    ]);
    let mut poller = Poller::new(&tracker, handle(), fast_settings());

    let result = poller.drain().await.expect("poll result");

    assert!(result.success());
    assert!(result.error().is_none());
    assert_eq!(result.operation().status, "DONE");
    assert_eq!(result.operation(), &op("op-1", "DONE"));
    assert_eq!(tracker.queries(), 3);
}

#[tokio::test]
async fn test_done_with_error_keeps_error_verbatim() {
    let error = json!({"code": 400, "message": "bad request"});
    let tracker = ScriptedTracker::new(vec![failed_op("op-1", error.clone())]);
    let mut poller = Poller::new(&tracker, handle(), fast_settings());

    let result = poller.drain().await.expect("poll result");

    assert!(!result.success());
    assert_eq!(result.error(), Some(&error));
}

#[tokio::test]
async fn test_pending_events_carry_observed_status() {
    let tracker = ScriptedTracker::new(vec![
        op("op-1", "PENDING"),
        op("op-1", "STOPPING"),
        op("op-1", "DONE"),
    ]);
    let mut poller = Poller::new(&tracker, handle(), fast_settings());

    let mut statuses = Vec::new();
    while let Some(event) = poller.next_event().await.expect("event") {
        match event {
            PollEvent::Pending { status } => statuses.push(status),
            PollEvent::Done(result) => {
                assert!(result.success());
                statuses.push("DONE".to_string());
            }
        }
    }
    assert_eq!(statuses, ["PENDING", "STOPPING", "DONE"]);
}

#[tokio::test]
async fn test_sequence_is_exhausted_after_done() {
    let tracker = ScriptedTracker::new(vec![op("op-1", "DONE")]);
    let mut poller = Poller::new(&tracker, handle(), fast_settings());

    poller.drain().await.expect("first drain");
    assert!(poller.next_event().await.expect("no error").is_none());
    let err = poller.drain().await.unwrap_err();
    assert!(matches!(err, PollError::Exhausted { .. }));
    assert_eq!(tracker.queries(), 1, "no query after the sequence ended");
}

#[tokio::test]
async fn test_requerying_done_operation_yields_same_result() {
    let tracker = ScriptedTracker::new(vec![op("op-1", "RUNNING"), op("op-1", "DONE")]);
    let first = Poller::new(&tracker, handle(), fast_settings())
        .drain()
        .await
        .expect("first");
    let second = Poller::new(&tracker, handle(), fast_settings())
        .drain()
        .await
        .expect("second");
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_never_done_times_out_naming_operation_and_timeout() {
    let tracker = ScriptedTracker::stuck();
    let settings = PollSettings {
        timeout: Duration::from_secs(1),
        interval: Duration::from_millis(100),
    };
    let started = tokio::time::Instant::now();
    let mut poller = Poller::new(&tracker, OperationHandle::zonal("op-stuck", ZONE), settings);

    let err = poller.drain().await.unwrap_err();

    assert!(matches!(err, PollError::OperationTimeout { .. }));
    assert_eq!(err.to_string(), "Operation op-stuck timed out after 1 seconds");
    assert!(started.elapsed() >= settings.timeout);
    assert!(tracker.queries() >= 10, "queries: {}", tracker.queries());
}

#[tokio::test]
async fn test_query_failure_is_a_query_fault() {
    let tracker = ScriptedTracker::failing("503 Service Unavailable");
    let mut poller = Poller::new(&tracker, handle(), fast_settings());

    let err = poller.drain().await.unwrap_err();

    match err {
        PollError::Query { operation, message } => {
            assert_eq!(operation, "op-1");
            assert!(message.contains("503"));
        }
        other => panic!("expected a query fault, got {other:?}"),
    }
    assert!(poller.next_event().await.expect("exhausted").is_none());
}

#[test]
fn test_invalid_scope_fails_before_any_query() {
    let tracker = ScriptedTracker::new(vec![op("op-1", "DONE")]);
    let err = OperationHandle::new("op-1", "invalid", Some(ZONE)).unwrap_err();
    assert!(matches!(err, PollError::InvalidScope { .. }));
    assert_eq!(tracker.queries(), 0);
}

#[test]
fn test_zone_scope_without_zone_is_invalid() {
    let err = OperationHandle::new("op-1", "zone", None).unwrap_err();
    assert!(matches!(err, PollError::InvalidScope { .. }));
}
