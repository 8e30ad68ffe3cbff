//! Integration tests for the Worker module

use super::*;
use crate::channel::{StartGate, WorkerEvent};
use crate::config::RunConfig;
use crate::mock::{MockJob, Outcome};

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Helpers
// ============================================================================

fn spawn_worker(
    index: usize,
    config: RunConfig,
    job: MockJob,
) -> (
    StartGate,
    mpsc::Receiver<WorkerEvent>,
    tokio::task::JoinHandle<crate::error::BenchResult<()>>,
) {
    let (tx, rx) = mpsc::channel(4);
    let (gate, signal) = StartGate::new();
    let worker = WorkerBuilder::new(index)
        .config(Arc::new(config))
        .job(Box::new(job))
        .events(tx)
        .start_signal(signal)
        .build()
        .expect("Failed to build worker");

    (gate, rx, tokio::spawn(worker.run()))
}

async fn expect_ready(rx: &mut mpsc::Receiver<WorkerEvent>) -> usize {
    match rx.recv().await {
        Some(WorkerEvent::Ready { worker_index }) => worker_index,
        other => panic!("Expected Ready, got {other:?}"),
    }
}

async fn expect_finished(rx: &mut mpsc::Receiver<WorkerEvent>) -> WorkerResult {
    match rx.recv().await {
        Some(WorkerEvent::Finished(result)) => result,
        other => panic!("Expected Finished, got {other:?}"),
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_worker_runs_ceiling_share() {
    let (gate, mut rx, handle) = spawn_worker(2, RunConfig::new(4, 10), MockJob::new());

    assert_eq!(expect_ready(&mut rx).await, 2);
    gate.open();
    let result = expect_finished(&mut rx).await;

    handle.await.unwrap().unwrap();
    assert_eq!(result.worker_index, 2);
    assert_eq!(result.count, 3);
    assert_eq!(result.success, 3);
    assert!(result.is_clean());
    assert!(result.start_time.is_some());
    assert!(result.end_time >= result.start_time);
}

#[tokio::test]
async fn test_worker_waits_for_gate() {
    let (gate, mut rx, handle) = spawn_worker(0, RunConfig::new(1, 5), MockJob::new());

    expect_ready(&mut rx).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    // Nothing beyond Ready until released
    assert!(rx.try_recv().is_err());
    assert!(!handle.is_finished());

    gate.open();
    let result = expect_finished(&mut rx).await;
    assert_eq!(result.count, 5);
}

#[tokio::test]
async fn test_worker_timing_excludes_setup() {
    let job = MockJob::new().with_init_delay(Duration::from_millis(50));
    let (gate, mut rx, _handle) = spawn_worker(0, RunConfig::new(1, 1), job);

    expect_ready(&mut rx).await;
    gate.open();
    let result = expect_finished(&mut rx).await;

    assert!(result.elapsed < Duration::from_millis(50));
}

#[tokio::test]
async fn test_worker_alternating_outcomes() {
    let job = MockJob::new().with_outcome(Outcome::Alternate);
    let (gate, mut rx, _handle) = spawn_worker(0, RunConfig::new(2, 9), job);

    expect_ready(&mut rx).await;
    gate.open();
    let result = expect_finished(&mut rx).await;

    // share = 5: true, false, true, false, true
    assert_eq!(result.count, 5);
    assert_eq!(result.success, 3);
}

#[tokio::test]
async fn test_worker_false_is_not_a_fault() {
    let job = MockJob::new().with_outcome(Outcome::AlwaysFalse);
    let (gate, mut rx, _handle) = spawn_worker(0, RunConfig::new(1, 4), job);

    expect_ready(&mut rx).await;
    gate.open();
    let result = expect_finished(&mut rx).await;

    assert_eq!(result.count, 4);
    assert_eq!(result.success, 0);
    assert!(result.is_clean());
}

// ============================================================================
// Faults
// ============================================================================

#[tokio::test]
async fn test_worker_init_failure_still_arrives() {
    let job = MockJob::new().failing_init();
    let finished = job.finish_counter();
    let (_gate, mut rx, handle) = spawn_worker(0, RunConfig::new(1, 4), job);

    // Arrives at the barrier and reports without waiting for release
    expect_ready(&mut rx).await;
    let result = expect_finished(&mut rx).await;

    handle.await.unwrap().unwrap();
    assert!(matches!(result.fault, Some(WorkerFault::Init(_))));
    assert_eq!(result.count, 0);
    assert!(result.start_time.is_none());
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_worker_request_error_stops_and_reports() {
    let job = MockJob::new().failing_request_at(2);
    let finished = job.finish_counter();
    let (gate, mut rx, _handle) = spawn_worker(0, RunConfig::new(1, 10), job);

    expect_ready(&mut rx).await;
    gate.open();
    let result = expect_finished(&mut rx).await;

    assert_eq!(result.count, 3);
    assert_eq!(result.success, 2);
    assert!(matches!(
        result.fault,
        Some(WorkerFault::Request { iteration: 2, .. })
    ));
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_worker_finish_failure_reported() {
    let job = MockJob::new().failing_finish();
    let (gate, mut rx, _handle) = spawn_worker(0, RunConfig::new(1, 2), job);

    expect_ready(&mut rx).await;
    gate.open();
    let result = expect_finished(&mut rx).await;

    assert_eq!(result.count, 2);
    assert_eq!(result.success, 2);
    assert!(matches!(result.fault, Some(WorkerFault::Finish(_))));
}

#[tokio::test]
async fn test_worker_dropped_gate_returns_error() {
    let job = MockJob::new();
    let finished = job.finish_counter();
    let (gate, mut rx, handle) = spawn_worker(0, RunConfig::new(1, 2), job);

    expect_ready(&mut rx).await;
    drop(gate);

    assert!(handle.await.unwrap().is_err());
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_worker_closed_channel_returns_error() {
    let (gate, rx, handle) = spawn_worker(0, RunConfig::new(1, 2), MockJob::new());
    drop(rx);
    gate.open();

    assert!(handle.await.unwrap().is_err());
}
