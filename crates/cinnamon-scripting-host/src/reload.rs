use tokio::sync::watch;
use tracing::info;

/// Sent each time a script reload is requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal {
    /// Number of reloads requested so far
    pub generation: u64,
}

/// Create a reload signal channel and spawn a SIGUSR2 handler.
///
/// The receiver changes every time the process receives SIGUSR2. Must be called
/// from within a tokio runtime.
#[cfg(unix)]
pub fn setup_reload_signal() -> watch::Receiver<ReloadSignal> {
    let (reload_tx, reload_rx) = watch::channel(ReloadSignal { generation: 0 });

    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigusr2 = match signal(SignalKind::user_defined2()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(target: "cinnamon::scripting", "Failed to register SIGUSR2 handler: {}", e);
                return;
            }
        };

        let mut generation = 0;
        while sigusr2.recv().await.is_some() {
            generation += 1;
            info!(target: "cinnamon::scripting", "Received SIGUSR2 - triggering script reload");

            if reload_tx.send(ReloadSignal { generation }).is_err() {
                info!(target: "cinnamon::scripting", "Reload signal receiver dropped, shutting down SIGUSR2 handler");
                break;
            }
        }
    });

    reload_rx
}

/// Create a reload signal channel (non-Unix platforms don't support SIGUSR2)
#[cfg(not(unix))]
pub fn setup_reload_signal() -> watch::Receiver<ReloadSignal> {
    let (reload_tx, reload_rx) = watch::channel(ReloadSignal { generation: 0 });
    tracing::warn!(target: "cinnamon::scripting", "SIGUSR2 reload not supported on this platform");
    // Keep the sender alive but never send signals
    std::mem::forget(reload_tx);
    reload_rx
}
