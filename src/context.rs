//! Cancellable run context.
//!
//! A [`RunContext`] is threaded through operation properties so that long
//! running handler work (process execution, orchestration calls) can be
//! aborted from outside. Clones share the same cancellation state.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

use crate::errors::HandlerError;

/// Shared cancellation signal for a single logical run.
#[derive(Clone)]
pub struct RunContext {
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl RunContext {
    /// Create a fresh, uncancelled context.
    pub fn new() -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Signal cancellation to every clone of this context.
    pub fn cancel(&self) {
        // send_replace never fails, even with no live receivers
        self.shutdown_tx.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Return `Err(HandlerError::Cancelled)` once the context is cancelled.
    ///
    /// Handlers call this between units of work.
    pub fn check(&self) -> Result<(), HandlerError> {
        if self.is_cancelled() {
            Err(HandlerError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve once the context is cancelled.
    pub async fn cancelled(&self) {
        let mut shutdown_rx = self.shutdown_rx.clone();
        loop {
            if *shutdown_rx.borrow_and_update() {
                return;
            }
            // The sender lives in an Arc held by self, so it cannot be dropped
            // while we are waiting.
            if shutdown_rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// True when both handles share the same cancellation state.
    pub fn ptr_eq(&self, other: &RunContext) -> bool {
        Arc::ptr_eq(&self.shutdown_tx, &other.shutdown_tx)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
