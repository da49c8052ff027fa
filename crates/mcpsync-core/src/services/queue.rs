//! Single-consumer pass queue.
//!
//! All reconciliation passes funnel through one FIFO: a background worker
//! drains a channel of boxed futures and awaits each to completion before
//! dequeuing the next. This total ordering is the correctness backbone of
//! the engine — two passes started from stale vs. fresh document snapshots
//! must never interleave their remote writes.
//!
//! Passes are not cancellable mid-flight; a failed pass completes like any
//! other and the worker moves on to the next one.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::{mpsc, oneshot};

type QueuedPass = Pin<Box<dyn Future<Output = ()> + Send>>;

/// FIFO of pending passes with a single background consumer.
///
/// The queue itself is the only mutable shared state in the engine; it is
/// mutated only by appending.
pub struct PassQueue {
    tx: mpsc::UnboundedSender<QueuedPass>,
}

impl PassQueue {
    /// Create the queue and spawn its worker.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedPass>();
        tokio::spawn(async move {
            while let Some(pass) = rx.recv().await {
                pass.await;
            }
            tracing::debug!("pass queue worker stopped");
        });
        Self { tx }
    }

    /// Append a pass and return a handle resolving to its output.
    ///
    /// The pass only starts once every previously enqueued pass (success or
    /// failure) has completed. The receiver errors only if the worker is
    /// gone (runtime shutdown).
    pub fn enqueue<T, F>(&self, pass: F) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let queued: QueuedPass = Box::pin(async move {
            // The caller may have stopped waiting; the pass still runs to
            // completion to keep the FIFO's write ordering intact.
            let _ = done_tx.send(pass.await);
        });
        if self.tx.send(queued).is_err() {
            tracing::warn!("pass queue worker is gone; dropping pass");
        }
        done_rx
    }
}

impl Default for PassQueue {
    fn default() -> Self {
        Self::new()
    }
}
