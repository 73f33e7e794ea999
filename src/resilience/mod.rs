//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream call fails:
//!     → retries.rs (is this method/code combination retryable?)
//!     → backoff.rs (how long to wait before the next attempt)
//!     → upstream client re-issues the call with the same metadata
//! ```
//!
//! # Design Decisions
//! - Only idempotent methods are retried
//! - Only transport-level unavailability is retried; business errors never are
//! - Jittered backoff prevents thundering herd

pub mod backoff;
pub mod retries;
