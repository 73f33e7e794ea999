//! Retry rules for upstream calls.
//!
//! # Design Decisions
//! - Never retry non-idempotent methods (CreateUser)
//! - Retry only `UNAVAILABLE`: the call provably did not reach a handler
//!   or the connection dropped before a response

use tonic::Code;

use crate::upstream::UpstreamMethod;

/// Whether a failed call may be issued again.
pub fn is_retryable(method: UpstreamMethod, code: Code) -> bool {
    method.is_idempotent() && code == Code::Unavailable
}
