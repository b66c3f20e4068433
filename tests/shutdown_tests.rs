//! Integration tests for graceful shutdown of the background driver.

#![cfg(feature = "async")]

use cadencia::infrastructure::driver::{DriverConfig, PacingDriver};
use cadencia::infrastructure::mocks::Recorder;
use cadencia::{Debouncer, KeyedThrottler, SystemClock, TimerQueue};
use std::sync::Arc;
use std::time::Duration;

fn spawn_driver(queue: &Arc<TimerQueue>) -> cadencia::DriverHandle {
    PacingDriver::new(
        Arc::clone(queue),
        Arc::new(SystemClock::new()),
        DriverConfig::default(),
    )
    .start()
}

#[tokio::test]
async fn test_driver_fires_trailing_edges_end_to_end() {
    let queue = Arc::new(TimerQueue::new());
    let recorder: Recorder<&str> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::from_millis(30))
        .build();

    let handle = spawn_driver(&queue);

    debouncer.call("a");
    debouncer.call("b");

    // Wait out the quiet period plus a few polling intervals.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(recorder.calls(), vec!["b"]);

    handle.shutdown().await.expect("shutdown failed");
}

#[tokio::test]
async fn test_no_invocations_after_shutdown() {
    let queue = Arc::new(TimerQueue::new());
    let recorder: Recorder<u32> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::from_millis(20))
        .build();

    let handle = spawn_driver(&queue);

    debouncer.call(1);
    tokio::time::sleep(Duration::from_millis(80)).await;
    let count_before_shutdown = recorder.count();
    assert_eq!(count_before_shutdown, 1);

    // Explicitly call shutdown, then trigger again: with nobody polling the
    // queue, the trailing timer never fires.
    handle.shutdown().await.expect("shutdown failed");

    debouncer.call(2);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(recorder.count(), count_before_shutdown);
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn test_keyed_throttle_under_driver() {
    let queue = Arc::new(TimerQueue::new());
    let recorder: Recorder<(u32, u32)> = Recorder::new();

    let throttler = KeyedThrottler::builder(Arc::clone(&queue), recorder.keyed_callback())
        .with_delay(Duration::from_millis(50))
        .build();

    let handle = spawn_driver(&queue);

    // Each key gets its leading edge right away and one trailing call.
    for key in 0..3 {
        throttler.call(key, 1);
        throttler.call(key, 2);
    }
    assert_eq!(recorder.count(), 3);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(recorder.count(), 6);
    for key in 0..3 {
        assert!(recorder.calls().contains(&(key, 2)));
    }

    handle.shutdown().await.expect("shutdown failed");
}

#[tokio::test]
async fn test_concurrent_shutdown_safety() {
    // Multiple drivers over independent queues shut down cleanly in sequence
    let mut handles = vec![];

    for _ in 0..5 {
        let queue = Arc::new(TimerQueue::new());
        handles.push(spawn_driver(&queue));
    }

    tokio::time::sleep(Duration::from_millis(50)).await;

    for handle in handles {
        handle.shutdown().await.expect("shutdown failed");
    }
}
