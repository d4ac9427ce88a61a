//! Graceful shutdown signal handling.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable signal that can be triggered once and awaited anywhere.
///
/// # Example
///
/// ```rust
/// use webjars_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let waiter = shutdown.clone();
/// shutdown.trigger();
/// assert!(waiter.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Creates a signal triggered by SIGTERM or Ctrl-C.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();
        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });
        signal
    }

    /// Triggers the signal. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Returns `true` once triggered.
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes when the signal is triggered, immediately if it already was.
    pub async fn recv(&self) {
        let mut receiver = self.sender.subscribe();
        // the sender lives in self, so the channel cannot close here
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("received SIGTERM, shutting down");
                        return;
                    }
                    result = tokio::signal::ctrl_c() => {
                        ctrl_c_received(result).await;
                        return;
                    }
                }
            }
            Err(e) => tracing::warn!(error = %e, "cannot listen for SIGTERM"),
        }
    }

    ctrl_c_received(tokio::signal::ctrl_c().await).await;
}

async fn ctrl_c_received(result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::info!("received Ctrl-C, shutting down"),
        Err(e) => {
            tracing::error!(error = %e, "cannot listen for Ctrl-C; shutdown must be triggered manually");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_trigger_is_idempotent() {
        let shutdown = ShutdownSignal::new();
        assert!(!shutdown.is_shutdown());
        shutdown.trigger();
        shutdown.trigger();
        assert!(shutdown.is_shutdown());
    }

    #[tokio::test]
    async fn test_recv_after_trigger_completes() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), shutdown.recv())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_recv_wakes_waiters() {
        let shutdown = ShutdownSignal::new();
        let waiter = shutdown.clone();
        let task = tokio::spawn(async move { waiter.recv().await });

        tokio::task::yield_now().await;
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
