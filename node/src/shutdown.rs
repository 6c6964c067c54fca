//! Graceful shutdown plumbing for the daemon.
//!
//! Listens for SIGINT/SIGTERM and flips a `tokio::sync::watch` flag. The
//! task loop polls the flag between tasks and awaits it while sleeping, so a
//! signal never interrupts a task mid-run — an in-flight chain call is
//! allowed to finish or error normally.

use tokio::signal;
use tokio::sync::watch;

/// Owns the shutdown flag.
pub struct ShutdownController {
    tx: watch::Sender<bool>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A handle the task loop polls and awaits.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger shutdown programmatically.
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }

    /// Wait for SIGTERM or SIGINT, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!("received SIGINT, shutting down"); }
            _ = terminate => { tracing::info!("received SIGTERM, shutting down"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// A cloneable view of the shutdown flag.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown is requested (immediately if it already was).
    pub async fn wait(&mut self) {
        // The sender staying alive is the normal case; a dropped controller
        // also means shutdown.
        let _ = self.rx.wait_for(|flag| *flag).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn programmatic_shutdown_flips_the_flag() {
        let controller = ShutdownController::new();
        let mut signal = controller.signal();
        assert!(!signal.is_shutdown());

        controller.shutdown();
        signal.wait().await;
        assert!(signal.is_shutdown());
    }

    #[tokio::test]
    async fn all_clones_observe_shutdown() {
        let controller = ShutdownController::new();
        let mut first = controller.signal();
        let mut second = first.clone();

        controller.shutdown();
        first.wait().await;
        second.wait().await;
        assert!(first.is_shutdown());
        assert!(second.is_shutdown());
    }

    #[tokio::test]
    async fn wait_returns_even_if_controller_dropped() {
        let controller = ShutdownController::new();
        let mut signal = controller.signal();
        drop(controller);
        // Must not hang.
        signal.wait().await;
    }
}
