//! Throttling a scroll position logger.
//!
//! Simulates a flood of scroll events. The throttler lets the first one
//! through immediately, then paces the rest to one per interval, always
//! ending on the latest position.

use cadencia::{Throttler, TimerQueue};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Scroll Logger Throttling Example ===\n");
    println!("Policy: 50ms interval; first event immediate, bursts pace to one per interval\n");

    let queue = Arc::new(TimerQueue::new());
    let start = Instant::now();
    let throttler = Throttler::builder(Arc::clone(&queue), move |offset: u32| {
        println!("  -> logged offset {offset}px at {:?}", start.elapsed());
    })
    .with_delay(Duration::from_millis(50))
    .build();

    println!("Scrolling: 60 events, one every 5ms:");
    for step in 1..=60u32 {
        throttler.call(step * 12);
        thread::sleep(Duration::from_millis(5));
        queue.run_due(Instant::now());
    }

    // Let the final trailing edge land.
    thread::sleep(Duration::from_millis(60));
    queue.run_due(Instant::now());

    println!("\nOne stray event after an idle stretch:");
    thread::sleep(Duration::from_millis(120));
    throttler.call(999);
    // Its deadline is already in the past, so this pass fires it.
    queue.run_due(Instant::now());

    let snapshot = throttler.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "Scroll events: {}, log lines: {}, coalesced: {}",
        snapshot.triggers, snapshot.invocations, snapshot.coalesced
    );
}
