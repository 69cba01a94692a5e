//! Graceful shutdown handling
//!
//! `shutdown_signal` waits for Ctrl-C or SIGTERM; `ShutdownCoordinator` fans the
//! decision out to background tasks (event consumer, session sweeper) through
//! cloneable `ShutdownToken`s.

use tokio::signal;
use tokio::sync::watch;

/// Wait for a shutdown signal (Ctrl-C or SIGTERM).
///
/// If a handler cannot be installed, that signal source is ignored and the other one
/// still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Owner side of the shutdown flag
#[derive(Debug)]
pub struct ShutdownCoordinator {
    notify: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(false);
        Self { notify }
    }

    /// Hand out a token; tokens created after `shutdown` observe it immediately
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            receiver: self.notify.subscribe(),
        }
    }

    /// Trigger shutdown
    pub fn shutdown(&self) {
        self.notify.send_replace(true);
    }

    /// Wait for an OS signal, then trigger shutdown
    pub async fn wait_for_signal(&self) {
        shutdown_signal().await;
        self.shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener side of the shutdown flag
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    receiver: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Whether shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once shutdown is requested (or the coordinator is dropped)
    pub async fn cancelled(&mut self) {
        // An error means the coordinator is gone, which also ends the process.
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }
}
