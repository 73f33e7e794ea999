//! Asynchronous diagnostics pipeline.
//!
//! # Data Flow
//! ```text
//! Producers (handlers, interceptors, coordinator)
//!     → Diagnostics::enqueue (non-blocking try_send)
//!         ├─ capacity available → bounded queue → drain task → LogSink
//!         ├─ queue full         → LogSink (synchronous, tagged overflow)
//!         └─ channel closed     → LogSink (synchronous, tagged late)
//! ```
//!
//! # Design Decisions
//! - One explicitly constructed channel per process, owned by the coordinator
//!   and handed to every component by cloning the producer handle
//! - Per-producer FIFO comes from the mpsc queue; nothing is ordered across
//!   producers
//! - No event is ever dropped: overflow and post-close events are emitted on
//!   the caller's thread
//! - The drain task stops only after close is requested and the queue is empty

pub mod channel;
pub mod event;
pub mod sink;

pub use channel::{Diagnostics, DiagnosticsChannel, DrainReport, DEFAULT_CAPACITY};
pub use event::{Emission, EventKind, LogEvent};
pub use sink::{LogSink, MemorySink, TracingSink};
