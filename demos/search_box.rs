//! Debouncing a search box.
//!
//! Simulates a user typing into a search field. Every keystroke asks for a
//! search, but the debouncer runs only one after the typing pauses, with the
//! text captured by the final keystroke.

use cadencia::{Debouncer, TimerQueue};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Sleep in small steps, firing due timers along the way. A real host would
/// do this from its event loop or the async driver.
fn pump(queue: &TimerQueue, window: Duration) {
    let end = Instant::now() + window;
    while Instant::now() < end {
        thread::sleep(Duration::from_millis(10));
        queue.run_due(Instant::now());
    }
}

fn type_text(debouncer: &Debouncer<String, Arc<TimerQueue>>, queue: &TimerQueue, text: &str) {
    for i in 1..=text.len() {
        let partial = &text[..i];
        println!("  keystroke: {partial:?}");
        debouncer.call(partial.to_string());
        // Keystrokes land 40ms apart, well inside the 150ms delay.
        thread::sleep(Duration::from_millis(40));
        queue.run_due(Instant::now());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Search Box Debouncing Example ===\n");
    println!("Policy: 150ms trailing edge; a burst of keystrokes runs one search\n");

    let queue = Arc::new(TimerQueue::new());
    let debouncer = Debouncer::builder(Arc::clone(&queue), |query: String| {
        println!("  -> searching for {query:?}");
    })
    .with_delay(Duration::from_millis(150))
    .build();

    println!("Typing \"cadencia\":");
    type_text(&debouncer, &queue, "cadencia");

    // The user stops typing; the trailing timer fires once with the full text.
    println!("Pausing...");
    pump(&queue, Duration::from_millis(250));

    println!("\nTyping \"tempo\" after the pause (a fresh burst, a fresh search):");
    type_text(&debouncer, &queue, "tempo");
    println!("Pausing...");
    pump(&queue, Duration::from_millis(250));

    let snapshot = debouncer.metrics().snapshot();
    println!("\n=== Example Complete ===");
    println!(
        "Keystrokes: {}, searches: {}, coalesced: {} ({:.0}% of calls saved)",
        snapshot.triggers,
        snapshot.invocations,
        snapshot.coalesced,
        snapshot.coalesce_rate() * 100.0
    );
}
