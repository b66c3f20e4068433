//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Pacer (routes calls through a pacing policy and the timer port)
//! - Keyed pacers (one independent pacer per key)
//! - Metrics (counters for triggers, invocations and coalesced calls)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod keyed;
pub mod metrics;
pub mod pacer;
pub mod ports;
