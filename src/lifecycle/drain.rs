//! Bounded drain for a serve loop.
//!
//! A front-end's serve future runs normally until shutdown is signalled.
//! From then on it has `deadline` to finish in-flight work; if it does not,
//! the future is dropped and whatever is still running is abandoned.

use std::future::Future;
use std::time::Duration;

use crate::lifecycle::shutdown::ShutdownSignal;

/// How a serve loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Stopped on its own: drained cleanly, or exited before any signal.
    Completed,
    /// Drain deadline elapsed and the loop was dropped.
    Abandoned,
}

/// Drive `serve`, allowing at most `deadline` after `shutdown` fires.
pub async fn bounded<F, E>(
    serve: F,
    mut shutdown: ShutdownSignal,
    deadline: Duration,
) -> Result<DrainOutcome, E>
where
    F: Future<Output = Result<(), E>>,
{
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => return result.map(|()| DrainOutcome::Completed),
        _ = shutdown.recv() => {}
    }

    match tokio::time::timeout(deadline, serve).await {
        Ok(result) => result.map(|()| DrainOutcome::Completed),
        Err(_) => Ok(DrainOutcome::Abandoned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::shutdown::Shutdown;
    use std::convert::Infallible;
    use std::time::Instant;

    #[tokio::test]
    async fn completes_when_serve_finishes_within_deadline() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        let mut inner = shutdown.subscribe();

        let serve = async move {
            inner.recv().await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<(), Infallible>(())
        };

        shutdown.trigger();
        let outcome = bounded(serve, signal, Duration::from_secs(1)).await.unwrap();
        assert_eq!(outcome, DrainOutcome::Completed);
    }

    #[tokio::test]
    async fn abandons_after_deadline() {
        let shutdown = Shutdown::new();
        let signal = shutdown.subscribe();
        let serve = std::future::pending::<Result<(), Infallible>>();

        shutdown.trigger();
        let start = Instant::now();
        let outcome = bounded(serve, signal, Duration::from_millis(50)).await.unwrap();
        assert_eq!(outcome, DrainOutcome::Abandoned);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn early_error_is_returned() {
        let shutdown = Shutdown::new();
        let serve = async { Err::<(), _>("boom") };
        let result = bounded(serve, shutdown.subscribe(), Duration::from_secs(1)).await;
        assert_eq!(result, Err("boom"));
    }
}
