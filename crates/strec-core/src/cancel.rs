//! Process-wide shutdown signal: one-shot, single-writer, many-reader.
//!
//! Every capture job and every in-flight subprocess wait observes the same
//! token. Once triggered it stays triggered; `trigger` reports whether the
//! call was the first so the shutdown event is logged exactly once even when
//! the interrupt arrives on several paths at the same time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Shared one-shot cancellation token.
///
/// Cloning is cheap; all clones observe the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    inner: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self {
            inner: CancellationToken::new(),
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests shutdown. Returns true only for the first caller; later (or
    /// concurrent) calls are no-ops and return false.
    pub fn trigger(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.cancel();
        true
    }

    /// True once shutdown has been requested. Never resets.
    pub fn is_triggered(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Resolves when shutdown is requested; resolves immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await;
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Registers the Ctrl-C handler that feeds the token.
///
/// Runs for the life of the process: the first interrupt triggers the token,
/// repeated interrupts are ignored so a second Ctrl-C cannot re-fire the
/// shutdown path while jobs are draining.
pub fn listen_for_interrupt(shutdown: ShutdownToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("interrupt handler unavailable; Ctrl-C will not stop jobs gracefully");
                return;
            }
            if shutdown.trigger() {
                tracing::warn!("interrupt received, stopping all capture jobs");
            } else {
                tracing::debug!("repeated interrupt ignored, shutdown already in progress");
            }
        }
    })
}
