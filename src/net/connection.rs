//! In-flight request tracking.
//!
//! # Responsibilities
//! - Count requests/calls currently being handled by a front-end
//! - Release the slot automatically when the handler finishes or is dropped

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counter of in-flight work. Clones observe the same count.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    active: Arc<AtomicU64>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one unit of in-flight work. The returned guard releases it on drop.
    pub fn track(&self) -> InFlightGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn count(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }
}

/// Held for the lifetime of one request or call.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
