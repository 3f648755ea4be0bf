//! Foreground execution context.
//!
//! Background completions (sync finishing, budget expiry) run on runtime
//! worker threads. Anything that touches the UI surface must hop back to the
//! foreground first; this queue makes that hop an explicit call instead of
//! an implicit OS dispatch.
//!
//! # Example
//!
//! ```
//! use tabhost::lifecycle::foreground_queue;
//!
//! let (queue, mut foreground) = foreground_queue();
//! queue.dispatch(|| println!("on the foreground"));
//!
//! // A host with its own UI loop pumps the queue once per turn.
//! assert_eq!(foreground.drain(), 1);
//! ```

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Unit of work for the foreground context.
pub type ForegroundTask = Box<dyn FnOnce() + Send + 'static>;

/// Create a connected queue/loop pair.
pub fn foreground_queue() -> (ForegroundQueue, ForegroundLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ForegroundQueue { tx }, ForegroundLoop { rx })
}

/// Sending half: schedules work for the next foreground turn.
#[derive(Debug, Clone)]
pub struct ForegroundQueue {
    tx: mpsc::UnboundedSender<ForegroundTask>,
}

impl ForegroundQueue {
    /// Schedule `task` to run on the foreground context.
    ///
    /// Returns `false` if the foreground loop has gone away.
    pub fn dispatch<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(task)).is_ok()
    }
}

/// Receiving half: runs scheduled work in order.
#[derive(Debug)]
pub struct ForegroundLoop {
    rx: mpsc::UnboundedReceiver<ForegroundTask>,
}

impl ForegroundLoop {
    /// Run every task queued so far, in order, on the calling thread.
    ///
    /// Returns the number of tasks executed.
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Run tasks as they arrive until `shutdown` is cancelled or every
    /// queue handle is dropped.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Foreground loop starting");
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    let ran = self.drain();
                    debug!(ran, "Foreground loop drained on shutdown");
                    break;
                }

                task = self.rx.recv() => match task {
                    Some(task) => task(),
                    None => break,
                },
            }
        }
        info!("Foreground loop stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_drain_runs_in_order() {
        let (queue, mut foreground) = foreground_queue();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            assert!(queue.dispatch(move || seen.lock().push(i)));
        }

        assert_eq!(foreground.drain(), 3);
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
        assert_eq!(foreground.drain(), 0);
    }

    #[test]
    fn test_dispatch_after_loop_dropped() {
        let (queue, foreground) = foreground_queue();
        drop(foreground);
        assert!(!queue.dispatch(|| {}));
    }

    #[tokio::test]
    async fn test_run_until_cancelled() {
        let (queue, foreground) = foreground_queue();
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(foreground.run(shutdown.clone()));

        let (tx, rx) = tokio::sync::oneshot::channel();
        queue.dispatch(move || {
            let _ = tx.send(7);
        });
        assert_eq!(rx.await.unwrap(), 7);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_when_queues_dropped() {
        let (queue, foreground) = foreground_queue();
        drop(queue);
        foreground.run(CancellationToken::new()).await;
    }
}
