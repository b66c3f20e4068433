//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the crate:
//! - Pacing policies (debounce, throttle)
//! - Checksum validators for Spanish identifiers
//! - Base64 payload weight estimation
//!
//! All types in this layer are pure and easily testable.

pub mod base64_size;
pub mod pacing;
pub mod spanish_id;
