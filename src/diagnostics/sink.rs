//! Destinations for diagnostic events.

use std::sync::{Arc, Mutex};

use crate::diagnostics::event::{Emission, EventKind, LogEvent};

/// Final destination of every log event.
///
/// Called from the drain task for queued events and from producer threads for
/// overflow or late events, so implementations must tolerate concurrent calls.
pub trait LogSink: Send + Sync + 'static {
    fn emit(&self, event: &LogEvent, emission: Emission);
}

/// Writes events through the process-wide `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, event: &LogEvent, emission: Emission) {
        match emission {
            Emission::Queued => tracing::info!(
                target: "diagnostics",
                kind = %event.kind(),
                "{}",
                event.message()
            ),
            Emission::Overflow => tracing::warn!(
                target: "diagnostics",
                kind = %event.kind(),
                overflow = true,
                "{}",
                event.message()
            ),
            Emission::Late => tracing::warn!(
                target: "diagnostics",
                kind = %event.kind(),
                late = true,
                "{}",
                event.message()
            ),
        }
    }
}

/// Keeps every emitted event in memory. Used by tests and tooling.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<(LogEvent, Emission)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn records(&self) -> Vec<(LogEvent, Emission)> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Events of one kind, in emission order.
    pub fn events_of(&self, kind: EventKind) -> Vec<LogEvent> {
        self.records()
            .into_iter()
            .filter(|(event, _)| event.kind() == kind)
            .map(|(event, _)| event)
            .collect()
    }

    pub fn count(&self, emission: Emission) -> usize {
        self.records()
            .iter()
            .filter(|(_, e)| *e == emission)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemorySink {
    fn emit(&self, event: &LogEvent, emission: Emission) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((event.clone(), emission));
    }
}
