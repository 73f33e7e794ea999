//! Per front-end lifecycle state.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;

use crate::net::InFlightTracker;

/// Where a front-end is in its life. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ServerState {
    Created = 0,
    Listening = 1,
    Draining = 2,
    Stopped = 3,
}

impl ServerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ServerState::Created,
            1 => ServerState::Listening,
            2 => ServerState::Draining,
            _ => ServerState::Stopped,
        }
    }
}

/// Shared view of one front-end, readable from the coordinator and tests
/// while the server task owns the serve loop.
#[derive(Debug)]
pub struct ServerStatus {
    name: &'static str,
    state: AtomicU8,
    local_addr: OnceLock<SocketAddr>,
    abandoned: AtomicBool,
    in_flight: InFlightTracker,
}

impl ServerStatus {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: AtomicU8::new(ServerState::Created as u8),
            local_addr: OnceLock::new(),
            abandoned: AtomicBool::new(false),
            in_flight: InFlightTracker::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> ServerState {
        ServerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move to `next` if it is ahead of the current state.
    ///
    /// Returns `false` when the transition would go backwards or stay put.
    pub fn advance(&self, next: ServerState) -> bool {
        let moved = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                (next as u8 > current).then_some(next as u8)
            })
            .is_ok();

        if moved {
            tracing::debug!(server = self.name, state = ?next, "Front-end state changed");
        }
        moved
    }

    /// Record the bound address and enter `Listening`.
    pub fn mark_listening(&self, addr: SocketAddr) {
        let _ = self.local_addr.set(addr);
        self.advance(ServerState::Listening);
    }

    /// Address actually bound, once listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Drain deadline elapsed with work still in flight.
    pub fn mark_abandoned(&self) {
        self.abandoned.store(true, Ordering::SeqCst);
    }

    pub fn drain_abandoned(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> &InFlightTracker {
        &self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_only_move_forward() {
        let status = ServerStatus::new("http");
        assert_eq!(status.state(), ServerState::Created);

        status.mark_listening("127.0.0.1:8080".parse().unwrap());
        assert_eq!(status.state(), ServerState::Listening);
        assert_eq!(status.local_addr().unwrap().port(), 8080);

        assert!(status.advance(ServerState::Draining));
        assert!(!status.advance(ServerState::Listening));
        assert!(!status.advance(ServerState::Draining));
        assert!(status.advance(ServerState::Stopped));
        assert_eq!(status.state(), ServerState::Stopped);
    }

    #[test]
    fn failed_bind_goes_straight_to_stopped() {
        let status = ServerStatus::new("rpc");
        assert!(status.advance(ServerState::Stopped));
        assert!(status.local_addr().is_none());
    }
}
