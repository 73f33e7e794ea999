//! OS signal handling.
//!
//! # Responsibilities
//! - Register SIGINT and SIGTERM handlers
//! - Forward every delivery to the coordinator, which decides what it means
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Repeated signals are forwarded too; the coordinator logs and ignores them

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Install the handlers and start forwarding.
///
/// The returned task ends when the receiver is dropped.
pub fn listen() -> std::io::Result<(mpsc::Receiver<&'static str>, JoinHandle<()>)> {
    let (tx, rx) = mpsc::channel(4);
    let task = spawn_forwarder(tx)?;
    Ok((rx, task))
}

#[cfg(unix)]
fn spawn_forwarder(tx: mpsc::Sender<&'static str>) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        loop {
            let name = tokio::select! {
                Some(()) = interrupt.recv() => "SIGINT",
                Some(()) = terminate.recv() => "SIGTERM",
                else => break,
            };
            tracing::debug!(signal = name, "Signal received");
            if tx.send(name).await.is_err() {
                break;
            }
        }
    }))
}

#[cfg(not(unix))]
fn spawn_forwarder(tx: mpsc::Sender<&'static str>) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!(signal = "ctrl_c", "Signal received");
            if tx.send("ctrl_c").await.is_err() {
                break;
            }
        }
    }))
}
