//! Shutdown coordination.
//!
//! The signal is a latch: once fired it stays fired, so a task that
//! subscribes late still stops instead of waiting forever.

use tokio::sync::watch;

/// Stop signal shared by the reflector and the metrics server.
///
/// Stopping is immediate: the mirror is disposable, so nothing is drained.
/// Dropping the `Shutdown` handle also stops every subscriber.
pub struct Shutdown {
    stopped: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self { stopped }
    }

    /// A receiver for one task.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            stopped: self.stopped.subscribe(),
        }
    }

    /// Fire the signal. Safe to call more than once.
    pub fn trigger(&self) {
        self.stopped.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Number of tasks still holding a [`ShutdownSignal`].
    pub fn receiver_count(&self) -> usize {
        self.stopped.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of [`Shutdown`], owned by one task.
pub struct ShutdownSignal {
    stopped: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown has been triggered or the handle dropped.
    ///
    /// Cancel safe; may be polled repeatedly inside `select!`.
    pub async fn recv(&mut self) {
        let _ = self.stopped.wait_for(|stopped| *stopped).await;
    }
}
