//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Front-end start
//!     → listener.rs (parse address, bind, ListenError on failure)
//!     → hand the bound listener to axum / tonic
//!
//! Every inbound request/call
//!     → connection.rs (InFlightTracker guard held until the response is produced)
//! ```
//!
//! # Design Decisions
//! - Bind failures are reported, never retried locally
//! - In-flight counts are observed during drain for logging and tests

pub mod connection;
pub mod listener;

pub use connection::{InFlightGuard, InFlightTracker};
pub use listener::{bind, ListenError};
