//! Upstream client subsystem.
//!
//! # Data Flow
//! ```text
//! Front-end handler
//!     → client.rs (UpstreamClient::get_user / create_user)
//!     → interceptor.rs (CallTiming: one log event per attempt)
//!     → tonic Channel (lazy or eager, pick-first or round-robin)
//!     → On UNAVAILABLE for idempotent calls: resilience::retries + backoff
//! ```
//!
//! # Design Decisions
//! - One handle per process, cloned by reference into both front-ends
//! - The tonic channel multiplexes internally, so no extra locking here
//! - The interceptor observes results and never alters them

pub mod client;
pub mod interceptor;

pub use client::{ConnectionError, UpstreamClient};
pub use interceptor::CallTiming;

/// Operations exposed by the upstream user service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamMethod {
    GetUser,
    CreateUser,
}

impl UpstreamMethod {
    /// Full gRPC method path, e.g. `/user.UserService/GetUser`.
    pub fn path(&self) -> &'static str {
        match self {
            UpstreamMethod::GetUser => "/user.UserService/GetUser",
            UpstreamMethod::CreateUser => "/user.UserService/CreateUser",
        }
    }

    /// Safe to issue more than once.
    pub fn is_idempotent(&self) -> bool {
        matches!(self, UpstreamMethod::GetUser)
    }
}

impl std::fmt::Display for UpstreamMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}
