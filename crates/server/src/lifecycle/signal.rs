//! Shutdown on SIGHUP, SIGTERM or SIGINT.
//!
//! SIGHUP is what `--stop` sends first, so it means "shut down" here rather
//! than "reload".

use tokio::signal::unix::{Signal, SignalKind, signal};
use tokio::sync::watch;

/// Listens for OS signals and flips the shutdown channel to `true`.
pub struct SignalHandler {
    shutdown_tx: watch::Sender<bool>,
    sighup: Signal,
    sigterm: Signal,
    sigint: Signal,
}

impl SignalHandler {
    /// Register the signal streams. Must be called from within a tokio
    /// runtime; once this returns the default actions are replaced, so a
    /// stop request can no longer kill the process outright.
    pub fn install(shutdown_tx: watch::Sender<bool>) -> std::io::Result<Self> {
        Ok(Self {
            shutdown_tx,
            sighup: signal(SignalKind::hangup())?,
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    /// Wait for the first shutdown signal, then notify.
    pub async fn run(mut self) {
        tokio::select! {
            _ = self.sighup.recv() => {
                tracing::info!("Received SIGHUP, initiating shutdown...");
            }
            _ = self.sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating shutdown...");
            }
            _ = self.sigint.recv() => {
                tracing::info!("Received SIGINT, initiating shutdown...");
            }
            _ = self.shutdown_tx.closed() => return,
        }

        let _ = self.shutdown_tx.send(true);
    }
}
