//! Cooperative cancellation between refinement iterations

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Shared flag checked by the refinement driver before every rewrite
///
/// Cancelling never interrupts an iteration in flight; the run stops at the
/// next check and keeps its best candidate.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// New, not cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancel `flag` on Ctrl+C or SIGTERM
///
/// Spawn this next to a batch run so a signal lets in-flight products
/// finish their current iteration and report.
pub async fn cancel_on_signal(flag: CancellationFlag) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C"),
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                info!("Received Ctrl+C");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        info!("Received Ctrl+C");
    }

    flag.cancel();
}
