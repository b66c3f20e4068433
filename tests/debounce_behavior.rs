use cadencia::infrastructure::mocks::{MockClock, Recorder};
use cadencia::{Debouncer, KeyedDebouncer, TimerQueue, DEFAULT_DEBOUNCE_DELAY};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn fixture() -> (Arc<TimerQueue>, Arc<MockClock>, Instant) {
    let queue = Arc::new(TimerQueue::new());
    let start = Instant::now();
    let clock = Arc::new(MockClock::new(start));
    (queue, clock, start)
}

#[test]
fn test_burst_collapses_into_one_trailing_invocation() {
    let (queue, clock, start) = fixture();
    let recorder: Recorder<&str> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::from_millis(150))
        .with_clock(clock.clone())
        .build();

    // Calls at t=0, t=50 and t=100 keep resetting the quiet period.
    debouncer.call("A");
    clock.advance(Duration::from_millis(50));
    debouncer.call("B");
    clock.advance(Duration::from_millis(50));
    debouncer.call("C");

    // The only live timer is the last reschedule, due at t=250.
    assert_eq!(
        queue.next_deadline(),
        Some(start + Duration::from_millis(250))
    );

    // Nothing fires before the quiet period ends.
    assert_eq!(queue.run_due(start + Duration::from_millis(249)), 0);
    assert_eq!(recorder.count(), 0);

    clock.set(start + Duration::from_millis(250));
    queue.run_due(start + Duration::from_millis(250));
    assert_eq!(recorder.calls(), vec!["C"]);
}

#[test]
fn test_quiet_streams_fire_separately() {
    let (queue, clock, start) = fixture();
    let recorder: Recorder<u32> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::from_millis(150))
        .with_clock(clock.clone())
        .build();

    debouncer.call(1);
    clock.set(start + Duration::from_millis(150));
    queue.run_due(start + Duration::from_millis(150));

    // A second call long after the first burst starts its own window.
    clock.set(start + Duration::from_millis(300));
    debouncer.call(2);
    clock.set(start + Duration::from_millis(450));
    queue.run_due(start + Duration::from_millis(450));

    assert_eq!(recorder.calls(), vec![1, 2]);
}

#[test]
fn test_latest_arguments_win_within_one_tick() {
    let (queue, clock, start) = fixture();
    let recorder: Recorder<String> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::from_millis(100))
        .with_clock(clock.clone())
        .build();

    debouncer.call("r".to_string());
    debouncer.call("ru".to_string());
    debouncer.call("rust".to_string());

    clock.set(start + Duration::from_millis(100));
    queue.run_due(start + Duration::from_millis(100));
    assert_eq!(recorder.calls(), vec!["rust".to_string()]);
}

#[test]
fn test_zero_delay_falls_back_to_default() {
    let (queue, clock, start) = fixture();
    let recorder: Recorder<u32> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::ZERO)
        .with_clock(clock.clone())
        .build();

    assert_eq!(debouncer.delay(), DEFAULT_DEBOUNCE_DELAY);

    debouncer.call(7);
    assert_eq!(queue.next_deadline(), Some(start + DEFAULT_DEBOUNCE_DELAY));

    clock.set(start + DEFAULT_DEBOUNCE_DELAY);
    queue.run_due(start + DEFAULT_DEBOUNCE_DELAY);
    assert_eq!(recorder.calls(), vec![7]);
}

#[test]
fn test_metrics_match_coalescing() {
    let (queue, clock, start) = fixture();
    let recorder: Recorder<u32> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::from_millis(100))
        .with_clock(clock.clone())
        .build();

    for i in 0..10 {
        debouncer.call(i);
    }

    clock.set(start + Duration::from_millis(100));
    queue.run_due(start + Duration::from_millis(100));

    // Verify metrics match the observed coalescing
    let snapshot = debouncer.metrics().snapshot();
    assert_eq!(snapshot.triggers, 10);
    assert_eq!(snapshot.invocations, 1);
    assert_eq!(snapshot.coalesced, 9);
    assert!((snapshot.coalesce_rate() - 0.9).abs() < f64::EPSILON);
    assert_eq!(recorder.calls(), vec![9]);
}

#[test]
fn test_clones_feed_one_stream() {
    let (queue, clock, start) = fixture();
    let recorder: Recorder<&str> = Recorder::new();

    let debouncer = Debouncer::builder(Arc::clone(&queue), recorder.callback())
        .with_delay(Duration::from_millis(100))
        .with_clock(clock.clone())
        .build();
    let clone = debouncer.clone();

    debouncer.call("from original");
    clone.call("from clone");

    clock.set(start + Duration::from_millis(100));
    queue.run_due(start + Duration::from_millis(100));

    // Both handles share state, so the burst still collapses to one call.
    assert_eq!(recorder.calls(), vec!["from clone"]);
    assert_eq!(debouncer.metrics().invocations(), 1);
}

#[test]
fn test_keyed_streams_debounce_independently() {
    let (queue, clock, start) = fixture();
    let recorder: Recorder<(&str, &str)> = Recorder::new();

    let debouncer = KeyedDebouncer::builder(Arc::clone(&queue), recorder.keyed_callback())
        .with_delay(Duration::from_millis(100))
        .with_clock(clock.clone())
        .build();

    debouncer.call("email", "user@exam");
    debouncer.call("email", "user@example.com");
    debouncer.call("phone", "600123123");

    clock.set(start + Duration::from_millis(100));
    queue.run_due(start + Duration::from_millis(100));

    let calls = recorder.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.contains(&("email", "user@example.com")));
    assert!(calls.contains(&("phone", "600123123")));
}

#[test]
fn test_high_concurrency_burst_stress() {
    use std::thread;

    let (queue, clock, start) = fixture();
    let recorder: Recorder<u32> = Recorder::new();

    let debouncer = Arc::new(
        Debouncer::builder(Arc::clone(&queue), recorder.callback())
            .with_delay(Duration::from_millis(150))
            .with_clock(clock.clone())
            .build(),
    );

    // Spawn 10 threads, each hammering the same debouncer 50 times
    let mut handles = vec![];
    for t in 0..10u32 {
        let debouncer = Arc::clone(&debouncer);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                debouncer.call(t * 100 + i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    // Total: 10 threads x 50 calls = 500 triggers, all inside one window
    clock.set(start + Duration::from_millis(150));
    queue.run_due(start + Duration::from_millis(150));

    let snapshot = debouncer.metrics().snapshot();
    assert_eq!(snapshot.triggers, 500);
    assert_eq!(snapshot.invocations, 1);
    assert_eq!(snapshot.coalesced, 499);
    assert_eq!(recorder.count(), 1);
}
