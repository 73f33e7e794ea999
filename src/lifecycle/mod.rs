//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (coordinator.rs):
//!     Diagnostics channel → Upstream client → HTTP + RPC front-ends
//!
//! Shutdown (coordinator.rs, shutdown.rs, drain.rs):
//!     First of {signal, front-end failure, cancellation}
//!         → Shutdown::trigger (broadcast, once)
//!         → each front-end drains under its own deadline
//!         → join both under the overall deadline
//!         → close diagnostics → drop upstream
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → forwarded to the coordinator
//! ```
//!
//! # Design Decisions
//! - One shutdown sequence per run: later triggers are logged and ignored
//! - Two deadlines: per front-end drain, and an outer bound on the whole sequence
//! - Diagnostics close after every front-end has stopped, upstream is released last

pub mod coordinator;
pub mod drain;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use coordinator::{Gateway, ShutdownReport, ShutdownTrigger};
pub use drain::{bounded, DrainOutcome};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use state::{ServerState, ServerStatus};
