//! Bounded log queue with a single drain task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::diagnostics::event::{Emission, EventKind, LogEvent};
use crate::diagnostics::sink::LogSink;
use crate::observability::metrics;

/// Design value for pending events.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Counters {
    overflowed: AtomicU64,
    late: AtomicU64,
}

/// Producer handle. Cheap to clone; every component that logs holds one.
#[derive(Clone)]
pub struct Diagnostics {
    tx: mpsc::Sender<LogEvent>,
    sink: Arc<dyn LogSink>,
    counters: Arc<Counters>,
}

impl Diagnostics {
    /// Queue an event without waiting.
    ///
    /// A full queue or a closed channel makes the event go straight to the
    /// sink on the calling thread.
    pub fn enqueue(&self, event: LogEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                self.counters.overflowed.fetch_add(1, Ordering::Relaxed);
                metrics::record_diagnostics_overflow();
                self.sink.emit(&event, Emission::Overflow);
            }
            Err(TrySendError::Closed(event)) => {
                self.counters.late.fetch_add(1, Ordering::Relaxed);
                self.sink.emit(&event, Emission::Late);
            }
        }
    }

    /// Shorthand for `enqueue(LogEvent::new(kind, message))`.
    pub fn log(&self, kind: EventKind, message: impl Into<String>) {
        self.enqueue(LogEvent::new(kind, message));
    }

    /// Events emitted synchronously because the queue was full.
    pub fn overflowed(&self) -> u64 {
        self.counters.overflowed.load(Ordering::Relaxed)
    }

    /// Events emitted synchronously because the channel was already closed.
    pub fn late(&self) -> u64 {
        self.counters.late.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("capacity", &self.tx.max_capacity())
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Outcome of closing the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    /// Events written by the drain task.
    pub drained: u64,
    /// Events that bypassed the queue because it was full.
    pub overflowed: u64,
    /// Events produced after close began.
    pub late: u64,
}

/// Owner side of the pipeline: holds the drain task and the close switch.
pub struct DiagnosticsChannel {
    handle: Diagnostics,
    close_tx: oneshot::Sender<()>,
    drain: JoinHandle<u64>,
}

impl DiagnosticsChannel {
    /// Create the queue and spawn its drain task on the current runtime.
    pub fn spawn(capacity: usize, sink: Arc<dyn LogSink>) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (close_tx, close_rx) = oneshot::channel();
        let drain = tokio::spawn(drain_loop(rx, close_rx, Arc::clone(&sink)));

        Self {
            handle: Diagnostics {
                tx,
                sink,
                counters: Arc::new(Counters::default()),
            },
            close_tx,
            drain,
        }
    }

    /// A producer handle for this channel.
    pub fn handle(&self) -> Diagnostics {
        self.handle.clone()
    }

    /// Stop accepting queued events, flush what is pending and join the drain
    /// task.
    pub async fn close(self) -> DrainReport {
        let _ = self.close_tx.send(());
        let drained = match self.drain.await {
            Ok(drained) => drained,
            Err(e) => {
                tracing::error!(error = %e, "Diagnostics drain task failed");
                0
            }
        };

        DrainReport {
            drained,
            overflowed: self.handle.overflowed(),
            late: self.handle.late(),
        }
    }
}

async fn drain_loop(
    mut rx: mpsc::Receiver<LogEvent>,
    mut close_rx: oneshot::Receiver<()>,
    sink: Arc<dyn LogSink>,
) -> u64 {
    let mut drained = 0u64;

    loop {
        tokio::select! {
            biased;
            next = rx.recv() => match next {
                Some(event) => {
                    sink.emit(&event, Emission::Queued);
                    drained += 1;
                }
                None => return drained,
            },
            // Fires on an explicit close and when the owner is dropped.
            _ = &mut close_rx => break,
        }
    }

    rx.close();
    while let Some(event) = rx.recv().await {
        sink.emit(&event, Emission::Queued);
        drained += 1;
    }
    drained
}
