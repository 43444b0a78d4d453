//! Caller-supplied cancellation for in-flight exchanges.
//!
//! A [`CancelHandle`] is held by the caller; the [`CancelSignal`] it
//! hands out is selected against the authority call, so a cancelled
//! exchange unwinds before any cache write happens.

use tokio::sync::watch;

/// Sender side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Create a new handle in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Get a signal observing this handle.
    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver side of a cancellation signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that is never cancelled.
    #[must_use]
    pub fn none() -> Self {
        let (tx, rx) = watch::channel(false);
        drop(tx);
        Self { rx }
    }

    /// Whether cancellation has already been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested; pend forever when the
    /// handle is dropped without cancelling.
    pub async fn cancelled(mut self) {
        if *self.rx.borrow() {
            return;
        }
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }
}
