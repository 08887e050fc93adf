//! Worker Lifecycle Tests
//!
//! End-to-end start / work / shutdown / failure paths through the public API

use async_trait::async_trait;
use shutdownable_core::port::fatal_handler::mocks::RecordingFatalHandler;
use shutdownable_core::{
    work_fn, BoxError, ShutdownableWorker, WorkUnit, WorkerError, WorkerHandle, WorkerStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Polls a fake source, pausing between polls the way a real poller would
struct Poller {
    polls: Arc<AtomicUsize>,
    fail_at: Option<usize>,
    interval: Duration,
}

#[async_trait]
impl WorkUnit for Poller {
    async fn do_work(&self, worker: &WorkerHandle) -> Result<(), BoxError> {
        let poll = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if Some(poll) == self.fail_at {
            return Err(format!("{}: poll {} failed", worker.name(), poll).into());
        }
        worker.pause(self.interval).await;
        Ok(())
    }
}

async fn eventually(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Test 1: Never-started worker reports the idle state
#[tokio::test]
async fn test_never_started_worker_state() {
    let worker = ShutdownableWorker::new(
        "never-started",
        work_fn(|_| async { Ok::<(), BoxError>(()) }),
    );

    assert!(worker.is_running());
    assert!(!worker.is_shutdown_initiated());
    assert!(!worker.is_shutdown_completed());
    assert!(!worker.is_failed());

    match worker.await_shutdown().await {
        Err(WorkerError::IllegalState(msg)) => {
            assert!(msg.contains("initiate_shutdown"));
        }
        other => panic!("expected IllegalState, got {:?}", other),
    }
}

/// Test 2: Clean shutdown of a pausing poller, no invocation after shutdown returns
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_poller_clean_shutdown() {
    let polls = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(RecordingFatalHandler::new());
    let worker = ShutdownableWorker::new(
        "poller",
        Poller {
            polls: Arc::clone(&polls),
            fail_at: None,
            interval: Duration::from_millis(5),
        },
    )
    .with_fatal_handler(handler.clone());

    worker.start().unwrap();
    eventually(|| polls.load(Ordering::SeqCst) >= 5).await;

    worker.shutdown().await.unwrap();

    assert!(worker.is_shutdown_completed());
    assert!(!worker.is_running());
    assert!(!worker.is_failed());
    assert_eq!(worker.status(), WorkerStatus::Stopped);
    assert_eq!(handler.call_count(), 0);

    let final_polls = polls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(polls.load(Ordering::SeqCst), final_polls);
}

/// Test 3: Work unit failure terminates the loop and reaches the fatal handler once
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_poller_failure_is_fatal() {
    let polls = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(RecordingFatalHandler::new());
    let worker = ShutdownableWorker::new(
        "flaky-poller",
        Poller {
            polls: Arc::clone(&polls),
            fail_at: Some(3),
            interval: Duration::from_millis(1),
        },
    )
    .with_fatal_handler(handler.clone());

    worker.start().unwrap();
    eventually(|| handler.call_count() == 1).await;

    assert!(worker.is_shutdown_completed());
    assert!(worker.is_failed());
    assert!(!worker.is_running());
    assert_eq!(worker.status(), WorkerStatus::Failed);

    // Not retried
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(polls.load(Ordering::SeqCst), 3);
    assert_eq!(handler.call_count(), 1);

    let calls = handler.calls();
    assert_eq!(calls[0].worker, "flaky-poller");
    assert!(calls[0].message.contains("poll 3 failed"));
}

/// Test 4: Immediate failure on the first invocation
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_immediate_failure() {
    let handler = Arc::new(RecordingFatalHandler::new());
    let worker = ShutdownableWorker::new(
        "doomed",
        work_fn(|_| async { Err::<(), BoxError>("config missing".into()) }),
    )
    .with_fatal_handler(handler.clone());

    worker.start().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(worker.is_shutdown_completed());
    assert!(worker.is_failed());
    assert_eq!(handler.call_count(), 1);
}

/// Test 5: Queries stay stable long after the worker went inert
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_queries_stable_after_stop() {
    let worker = ShutdownableWorker::new(
        "stable",
        work_fn(|worker| async move {
            worker.pause(Duration::from_millis(5)).await;
            Ok::<(), BoxError>(())
        }),
    );
    worker.start().unwrap();
    worker.shutdown().await.unwrap();

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(worker.is_shutdown_initiated());
        assert!(worker.is_shutdown_completed());
        assert!(!worker.is_running());
        assert!(!worker.is_failed());
        assert!(!worker.initiate_shutdown());
        worker.await_shutdown().await.unwrap();
    }
}

/// Test 6: pause timing with and without a pending shutdown
#[tokio::test]
async fn test_pause_timing() {
    let worker = ShutdownableWorker::new(
        "pauser",
        work_fn(|_| async { Ok::<(), BoxError>(()) }),
    );

    let start = Instant::now();
    worker.pause(Duration::from_millis(80)).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(75), "too short: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(800), "too long: {:?}", elapsed);

    worker.initiate_shutdown();
    let start = Instant::now();
    worker.pause(Duration::from_secs(5)).await;
    assert!(start.elapsed() < Duration::from_millis(200));
}

/// Test 7: A supervisor shutting down a worker that already failed
/// shutdown() returns normally and the worker still reads as failed
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_after_failure_returns_ok() {
    let polls = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(RecordingFatalHandler::new());
    let worker = ShutdownableWorker::new(
        "supervised",
        Poller {
            polls: Arc::clone(&polls),
            fail_at: Some(1),
            interval: Duration::from_millis(1),
        },
    )
    .with_fatal_handler(handler.clone());

    worker.start().unwrap();
    eventually(|| worker.is_failed()).await;

    worker.shutdown().await.unwrap();
    worker.await_shutdown().await.unwrap();

    assert!(worker.is_failed());
    assert!(!worker.is_shutdown_initiated());
    assert_eq!(worker.status(), WorkerStatus::Failed);
    assert_eq!(handler.call_count(), 1);
}

/// Test 8: pause on a worker that already failed does not sleep the full timeout
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pause_after_failure_returns_promptly() {
    let worker = ShutdownableWorker::new(
        "failed-pauser",
        work_fn(|_| async { Err::<(), BoxError>("broken pipe".into()) }),
    )
    .with_fatal_handler(Arc::new(RecordingFatalHandler::new()));

    worker.start().unwrap();
    eventually(|| worker.is_failed()).await;

    let start = Instant::now();
    worker.pause(Duration::from_secs(5)).await;
    assert!(start.elapsed() < Duration::from_millis(200));
}
